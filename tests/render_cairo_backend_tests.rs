#![cfg(feature = "cairo-backend")]

use cairo::{Context, Format, ImageSurface};
use sci_figure::api::{DataLine, Figure, SaveOptions, StyleContext, save_figure};
use sci_figure::error::FigureError;
use sci_figure::render::{CairoContextRenderer, CairoRenderer, Color, Renderer};

fn small_figure() -> Figure {
    let mut figure = Figure::new(2.0, 1.5, StyleContext::default()).expect("figure");
    let view = figure.current_view();
    figure
        .view_mut(view)
        .expect("view")
        .add_line(DataLine::from_xy(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.5], Color::BLACK))
        .expect("line");
    figure
}

#[test]
fn cairo_renderer_rejects_zero_dpi() {
    let err = CairoRenderer::new(0).expect_err("zero dpi must fail");
    assert!(matches!(err, FigureError::InvalidArgument(_)));
}

#[test]
fn cairo_surface_scales_with_dpi() {
    let figure = small_figure();
    let frame = figure.build_render_frame().expect("frame");
    let mut renderer = CairoRenderer::new(144).expect("renderer");
    renderer.render(&frame).expect("render");

    let surface = renderer.surface().expect("surface");
    assert_eq!(surface.width(), 288);
    assert_eq!(surface.height(), 216);
    let stats = renderer.last_stats();
    assert_eq!(stats.lines_drawn, frame.lines.len());
    assert_eq!(stats.texts_drawn, frame.texts.len());
}

#[test]
fn cairo_renderer_can_draw_on_external_context() {
    let figure = small_figure();
    let frame = figure.build_render_frame().expect("frame");
    let surface = ImageSurface::create(Format::ARgb32, 144, 108).expect("surface");
    let context = Context::new(&surface).expect("context");
    let mut renderer = CairoRenderer::new(72).expect("renderer");

    renderer
        .render_on_cairo_context(&context, &frame)
        .expect("render on context");
    assert!(renderer.last_stats().lines_drawn > 0);
}

#[test]
fn png_export_writes_a_png_signature() {
    let directory = std::env::temp_dir().join(format!("sci-figure-png-{}", std::process::id()));
    let options = SaveOptions {
        directory: directory.clone(),
        dpi: 100,
        ..SaveOptions::default()
    };
    let path = save_figure(true, &small_figure(), "plot.PNG", &options)
        .expect("save")
        .expect("path");

    let bytes = std::fs::read(&path).expect("read back");
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    std::fs::remove_dir_all(&directory).expect("cleanup");
}
