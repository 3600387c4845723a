//! Shaded 3-D surface of a [`ValueGrid`], projected orthographically onto a
//! 2-D view.

use ordered_float::OrderedFloat;
use tracing::debug;

use crate::api::figure::Figure;
use crate::api::labeled_grid::{
    AxisLabelConfig, ColorbarHandle, ContourOverlayConfig, GridAxis, ResolvedScaleConfig,
    ScaleConfig, resolve_axis_config, resolve_scale_config,
};
use crate::api::view::{ColorbarSpec, DataLine, DataPolygon, DataText, ViewId};
use crate::core::{
    BoxPoint, DataPoint, OrthoCamera, ValueGrid, contour_levels, finite_min_max,
    normalize_to_box, trace_contours,
};
use crate::error::{FigureError, FigureResult};
use crate::render::Color;

/// Fraction of the view height the surface colour bar occupies.
const COLORBAR_SHRINK: f64 = 0.7;
/// How far axis titles sit outside the unit box.
const TITLE_OFFSET: f64 = 0.18;
const FLOOR: f64 = -0.5;

/// Options of [`render_surface`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceOptions {
    pub row_axis: AxisLabelConfig,
    pub column_axis: AxisLabelConfig,
    pub scale: ScaleConfig,
    /// Contours projected on the floor of the box.
    pub contours: Option<ContourOverlayConfig>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceHandle {
    pub view: ViewId,
    pub colorbar: ColorbarHandle,
}

/// Draws `grid` as a shaded surface into `target` (or the current view).
///
/// Columns run along the box x axis, rows along y and values along z,
/// clamped to the resolved scale range.
pub fn render_surface(
    figure: &mut Figure,
    target: Option<ViewId>,
    row_coords: &[f64],
    column_coords: &[f64],
    grid: &ValueGrid,
    options: &SurfaceOptions,
) -> FigureResult<SurfaceHandle> {
    if row_coords.len() != grid.rows() || column_coords.len() != grid.columns() {
        return Err(FigureError::InvalidArgument(format!(
            "coordinates are {}x{} but the grid is {}x{}",
            row_coords.len(),
            column_coords.len(),
            grid.rows(),
            grid.columns()
        )));
    }
    if grid.rows() < 2 || grid.columns() < 2 {
        return Err(FigureError::InvalidData(
            "a surface needs at least a 2x2 grid".to_owned(),
        ));
    }

    let row_config = resolve_axis_config(row_coords, &options.row_axis, GridAxis::Rows)?;
    let column_config = resolve_axis_config(column_coords, &options.column_axis, GridAxis::Columns)?;
    let scale = resolve_scale_config(grid, &options.scale)?;
    let (x_min, x_max) = axis_range("column", column_coords)?;
    let (y_min, y_max) = axis_range("row", row_coords)?;

    let projector = BoxProjector {
        camera: OrthoCamera::new(scale.elevation, scale.azimuth),
        x_range: (x_min, x_max),
        y_range: (y_min, y_max),
        z_range: (scale.min, scale.max),
    };
    let camera = projector.camera;
    let unicode_minus = figure.style().unicode_minus;

    let mut quads: Vec<(OrderedFloat<f64>, DataPolygon)> = Vec::new();
    for row in 0..grid.rows() - 1 {
        for column in 0..grid.columns() - 1 {
            let corners = [(row, column), (row, column + 1), (row + 1, column + 1), (row + 1, column)];
            let values: Option<Vec<f64>> = corners
                .iter()
                .map(|&(r, c)| grid.get(r, c).filter(|value| value.is_finite()))
                .collect();
            let Some(values) = values else {
                continue;
            };

            let box_points: Vec<BoxPoint> = corners
                .iter()
                .zip(&values)
                .map(|(&(r, c), &value)| projector.to_box(column_coords[c], row_coords[r], value))
                .collect();
            let depth = box_points.iter().map(|&point| camera.depth(point)).sum::<f64>() / 4.0;
            let mean = values.iter().sum::<f64>() / 4.0;
            let fill = scale
                .colormap
                .map(mean.clamp(scale.min, scale.max), scale.min, scale.max)
                .with_alpha(scale.alpha);
            let outline = box_points.iter().map(|&point| camera.project(point)).collect();
            quads.push((OrderedFloat(depth), DataPolygon::new(outline, fill)));
        }
    }
    // Farthest first so nearer cells cover them.
    quads.sort_by_key(|(depth, _)| *depth);
    let quad_count = quads.len();

    let floor_edges = floor_box(camera);
    let titles = axis_titles(camera, &column_config.name, &row_config.name, &scale.name);
    let contour_overlay = options.contours.as_ref().map(|config| {
        floor_contours(grid, row_coords, column_coords, projector, &scale, config, unicode_minus)
    });

    let view_id = match target {
        Some(id) => {
            figure.view(id)?;
            id
        }
        None => figure.current_view(),
    };
    let view = figure.view_mut(view_id)?;
    view.set_axis_visible(false);
    view.set_equal_aspect(true);
    let ((x_low, x_high), (y_low, y_high)) = scene_limits(camera);
    view.set_x_limits(x_low, x_high)?;
    view.set_y_limits(y_low, y_high)?;
    for (_, quad) in quads {
        view.add_polygon(quad)?;
    }
    for edge in floor_edges {
        view.add_line(edge)?;
    }
    if let Some((lines, labels)) = contour_overlay {
        for line in lines {
            view.add_line(line)?;
        }
        for label in labels {
            view.add_text(label)?;
        }
    }
    for title in titles {
        view.add_text(title)?;
    }
    view.set_colorbar(ColorbarSpec {
        colormap: scale.colormap.clone(),
        value_min: scale.min,
        value_max: scale.max,
        label: scale.name.clone(),
        tick_count: scale.step,
        shrink: COLORBAR_SHRINK,
    })?;

    debug!(
        view = view_id.raw(),
        quads = quad_count,
        elevation = scale.elevation,
        azimuth = scale.azimuth,
        "rendered surface"
    );
    Ok(SurfaceHandle {
        view: view_id,
        colorbar: ColorbarHandle {
            view: view_id,
            value_min: scale.min,
            value_max: scale.max,
            label: scale.name,
        },
    })
}

/// Maps data coordinates into the unit box and onto the screen plane.
#[derive(Debug, Clone, Copy)]
struct BoxProjector {
    camera: OrthoCamera,
    x_range: (f64, f64),
    y_range: (f64, f64),
    z_range: (f64, f64),
}

impl BoxProjector {
    fn to_box(self, column: f64, row: f64, value: f64) -> BoxPoint {
        let (z_min, z_max) = self.z_range;
        BoxPoint::new(
            normalize_to_box(column, self.x_range.0, self.x_range.1),
            normalize_to_box(row, self.y_range.0, self.y_range.1),
            normalize_to_box(value.clamp(z_min, z_max), z_min, z_max),
        )
    }

    fn on_floor(self, column: f64, row: f64) -> DataPoint {
        let point = BoxPoint::new(
            normalize_to_box(column, self.x_range.0, self.x_range.1),
            normalize_to_box(row, self.y_range.0, self.y_range.1),
            FLOOR,
        );
        self.camera.project(point)
    }
}

/// Screen-plane extent of the box grown to the title ring, so titles stay
/// inside the plot area.
fn scene_limits(camera: OrthoCamera) -> ((f64, f64), (f64, f64)) {
    let reach = 0.5 + TITLE_OFFSET * 1.5;
    let mut x = (f64::INFINITY, f64::NEG_INFINITY);
    let mut y = (f64::INFINITY, f64::NEG_INFINITY);
    for corner in 0_u8..8 {
        let pick = |bit: u8| if corner & bit == 0 { -reach } else { reach };
        let point = camera.project(BoxPoint::new(pick(1), pick(2), pick(4)));
        x = (x.0.min(point.x), x.1.max(point.x));
        y = (y.0.min(point.y), y.1.max(point.y));
    }
    (x, y)
}

fn axis_range(axis: &str, coords: &[f64]) -> FigureResult<(f64, f64)> {
    if coords.iter().any(|value| !value.is_finite()) {
        return Err(FigureError::InvalidData(format!(
            "{axis} coordinates must be finite"
        )));
    }
    finite_min_max(coords)
        .ok_or_else(|| FigureError::InvalidData(format!("{axis} coordinates are empty")))
}

fn floor_box(camera: OrthoCamera) -> Vec<DataLine> {
    let corners = [
        BoxPoint::new(-0.5, -0.5, FLOOR),
        BoxPoint::new(0.5, -0.5, FLOOR),
        BoxPoint::new(0.5, 0.5, FLOOR),
        BoxPoint::new(-0.5, 0.5, FLOOR),
    ];
    (0..corners.len())
        .map(|index| {
            let start = camera.project(corners[index]);
            let end = camera.project(corners[(index + 1) % corners.len()]);
            DataLine::new(vec![start, end], Color::BLACK).with_stroke_width(0.8)
        })
        .collect()
}

fn axis_titles(camera: OrthoCamera, x_name: &str, y_name: &str, z_name: &str) -> Vec<DataText> {
    let outside = -0.5 - TITLE_OFFSET;
    [
        (BoxPoint::new(0.0, outside, FLOOR), x_name),
        (BoxPoint::new(outside, 0.0, FLOOR), y_name),
        (BoxPoint::new(outside, outside, 0.0), z_name),
    ]
    .into_iter()
    .filter(|(_, name)| !name.is_empty())
    .map(|(anchor, name)| DataText::new(camera.project(anchor), name, Color::BLACK))
    .collect()
}

/// Coordinate at a fractional grid index, linear between neighbours.
fn interpolate_coord(coords: &[f64], index: f64) -> f64 {
    let last = coords.len() - 1;
    let lower = (index.floor().max(0.0) as usize).min(last);
    let upper = (lower + 1).min(last);
    let frac = (index - lower as f64).clamp(0.0, 1.0);
    coords[lower] + (coords[upper] - coords[lower]) * frac
}

fn floor_contours(
    grid: &ValueGrid,
    row_coords: &[f64],
    column_coords: &[f64],
    projector: BoxProjector,
    scale: &ResolvedScaleConfig,
    config: &ContourOverlayConfig,
    unicode_minus: bool,
) -> (Vec<DataLine>, Vec<DataText>) {
    let levels = contour_levels(scale.min, scale.max, config.count);
    let mut lines = Vec::new();
    let mut labels = Vec::new();
    for contour in trace_contours(grid, &levels) {
        if contour.points.len() < 2 {
            continue;
        }
        let color = scale.colormap.map(contour.level, scale.min, scale.max);
        let points: Vec<DataPoint> = contour
            .points
            .iter()
            .map(|point| {
                let column = interpolate_coord(column_coords, point.x);
                let row = interpolate_coord(row_coords, point.y);
                projector.on_floor(column, row)
            })
            .collect();
        labels.push(DataText::new(
            points[points.len() / 2],
            config.label_format.format(contour.level, unicode_minus),
            color,
        ));
        lines.push(
            DataLine::new(points, color)
                .with_stroke_style(config.line_style)
                .with_stroke_width(config.stroke_width),
        );
    }
    (lines, labels)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::api::style::StyleContext;

    fn peak() -> ValueGrid {
        ValueGrid::from_fn(5, 5, |row, column| {
            let dr = row as f64 - 2.0;
            let dc = column as f64 - 2.0;
            10.0 - dr * dr - dc * dc
        })
        .expect("grid")
    }

    #[test]
    fn every_cell_becomes_one_quad() {
        let mut figure = Figure::new(6.0, 4.0, StyleContext::default()).expect("figure");
        let coords: Vec<f64> = (0_u32..5).map(f64::from).collect();
        let handle = render_surface(&mut figure, None, &coords, &coords, &peak(), &SurfaceOptions::default())
            .expect("surface");

        let view = figure.view(handle.view).expect("view");
        assert_eq!(view.polygons().len(), 16);
        assert!(!view.is_axis_visible());
        assert_eq!(view.colorbar().map(|bar| bar.shrink), Some(COLORBAR_SHRINK));
        assert_eq!(handle.colorbar.label, "z");
        assert_eq!((handle.colorbar.value_min, handle.colorbar.value_max), (2.0, 10.0));
    }

    #[test]
    fn floor_contours_use_colormap() {
        let mut figure = Figure::new(6.0, 4.0, StyleContext::default()).expect("figure");
        let coords: Vec<f64> = (0_u32..5).map(f64::from).collect();
        let options = SurfaceOptions {
            contours: Some(ContourOverlayConfig::default()),
            ..SurfaceOptions::default()
        };
        let handle = render_surface(&mut figure, None, &coords, &coords, &peak(), &options).expect("surface");
        let view = figure.view(handle.view).expect("view");
        // four floor edges plus at least one contour ring
        assert!(view.lines().len() > 4);
        assert!(view.lines()[4..].iter().all(|line| line.color != Color::WHITE));
    }

    #[test]
    fn fractional_index_interpolates_coordinates() {
        let coords = [0.0, 10.0, 30.0];
        assert_abs_diff_eq!(interpolate_coord(&coords, 0.5), 5.0);
        assert_abs_diff_eq!(interpolate_coord(&coords, 1.25), 15.0);
        assert_abs_diff_eq!(interpolate_coord(&coords, 2.0), 30.0);
    }

    #[test]
    fn single_row_grid_is_rejected() {
        let mut figure = Figure::new(6.0, 4.0, StyleContext::default()).expect("figure");
        let grid = ValueGrid::from_rows(&[[1.0, 2.0]]).expect("grid");
        let err = render_surface(&mut figure, None, &[0.0], &[0.0, 1.0], &grid, &SurfaceOptions::default())
            .expect_err("too small");
        assert!(matches!(err, FigureError::InvalidData(_)));
    }
}
