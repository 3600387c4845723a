use sci_figure::api::{
    AxisLabelConfig, CSL_4_1, ContourOverlayConfig, Figure, ScaleConfig, StyleContext,
    SurfaceOptions, custom_dark_red_white, palette_colors, palette_preview, render_surface,
};
use sci_figure::core::ValueGrid;
use sci_figure::error::FigureError;
use sci_figure::render::{NullRenderer, SvgRenderer};

fn ripple() -> (Vec<f64>, Vec<f64>, ValueGrid) {
    let rows: Vec<f64> = (0_u32..8).map(|i| f64::from(i) * 0.25).collect();
    let columns: Vec<f64> = (0_u32..10).map(|i| f64::from(i) * 0.2).collect();
    let grid = ValueGrid::from_fn(rows.len(), columns.len(), |row, column| {
        (rows[row] * 2.0).sin() + (columns[column] * 1.5).cos()
    })
    .expect("grid");
    (rows, columns, grid)
}

#[test]
fn surface_figure_builds_a_valid_frame() {
    let (rows, columns, grid) = ripple();
    let mut figure = Figure::new(6.0, 5.0, StyleContext::default()).expect("figure");
    let options = SurfaceOptions {
        row_axis: AxisLabelConfig {
            name: Some("depth".to_owned()),
            ..AxisLabelConfig::default()
        },
        column_axis: AxisLabelConfig {
            name: Some("time".to_owned()),
            ..AxisLabelConfig::default()
        },
        scale: ScaleConfig {
            name: Some("temperature".to_owned()),
            step: Some(4),
            ..ScaleConfig::default()
        },
        contours: Some(ContourOverlayConfig::default()),
    };

    let handle = render_surface(&mut figure, None, &rows, &columns, &grid, &options)
        .expect("surface");

    let view = figure.view(handle.view).expect("view");
    assert_eq!(view.polygons().len(), 7 * 9);
    assert_eq!(handle.colorbar.label, "temperature");

    let frame = figure.build_render_frame().expect("frame");
    frame.validate().expect("valid frame");
    for title in ["depth", "time", "temperature"] {
        assert!(frame.texts.iter().any(|text| text.text == title), "missing {title}");
    }

    let mut renderer = SvgRenderer::default();
    figure.render(&mut renderer).expect("svg");
    assert!(renderer.document().contains("<polygon"));
}

#[test]
fn surface_rejects_mismatched_coordinates() {
    let (rows, columns, grid) = ripple();
    let mut figure = Figure::new(6.0, 5.0, StyleContext::default()).expect("figure");
    let err = render_surface(
        &mut figure,
        None,
        &columns,
        &rows,
        &grid,
        &SurfaceOptions::default(),
    )
    .expect_err("transposed coordinates");
    assert!(matches!(err, FigureError::InvalidArgument(_)));
}

#[test]
fn palette_preview_lays_out_swatches_and_panels() {
    let colors = palette_colors(CSL_4_1).expect("palette");
    let figure = palette_preview(&colors, StyleContext::default()).expect("preview");

    // one swatch per colour plus the sine and growth panels
    assert_eq!(figure.views().len(), colors.len() + 2);
    let waves = &figure.views()[colors.len()];
    assert_eq!(waves.lines().len(), colors.len());

    let frame = figure.build_render_frame().expect("frame");
    frame.validate().expect("valid frame");
    let mut renderer = NullRenderer::default();
    figure.render(&mut renderer).expect("render");
    assert_eq!(renderer.last_line_count, frame.lines.len());
}

#[test]
fn custom_map_previews_its_samples() {
    let (map, samples) = custom_dark_red_white().expect("custom map");
    assert_eq!(map.name(), "custom");
    let figure = palette_preview(&samples, StyleContext::default()).expect("preview");
    assert_eq!(figure.views().len(), samples.len() + 2);
    assert!(matches!(
        palette_preview(&[], StyleContext::default()),
        Err(FigureError::InvalidArgument(_))
    ));
}
