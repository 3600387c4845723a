//! Heatmap rendering of a [`ValueGrid`] with sampled tick labels, optional
//! mask, contour overlay and colour bar.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::figure::Figure;
use crate::api::number_format::NumberFormat;
use crate::api::style::TickDirection;
use crate::api::view::{AxisTick, ColorbarSpec, DataLine, DataText, HeatmapLayer, ViewId};
use crate::core::{DataPoint, GridMask, ValueGrid, contour_levels, trace_contours};
use crate::error::{FigureError, FigureResult};
use crate::render::{Color, Colormap, LineStrokeStyle};

/// Which dimension of the grid an axis configuration labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridAxis {
    /// Grid rows, labelled along the vertical axis.
    Rows,
    /// Grid columns, labelled along the horizontal axis.
    Columns,
}

/// Caller-supplied axis labelling; every `None` falls back to a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisLabelConfig {
    pub name: Option<String>,
    pub step: Option<usize>,
    pub start: Option<usize>,
    pub end: Option<usize>,
    pub angle: Option<f64>,
    pub fmt: Option<String>,
}

/// Axis labelling with every key present.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedAxisConfig {
    pub name: String,
    pub step: usize,
    pub start: usize,
    pub end: usize,
    pub angle: f64,
    pub fmt: NumberFormat,
}

impl ResolvedAxisConfig {
    /// Sampled coordinate indices `start, start + step, … < end`.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        (self.start..self.end).step_by(self.step)
    }
}

/// Defaults shared by both grid axes; `end` defaults to the axis length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisLabelDefaults {
    pub row_name: &'static str,
    pub column_name: &'static str,
    pub step: usize,
    pub start: usize,
    pub angle: f64,
    pub fmt: &'static str,
}

pub const AXIS_LABEL_DEFAULTS: AxisLabelDefaults = AxisLabelDefaults {
    row_name: "x",
    column_name: "y",
    step: 5,
    start: 0,
    angle: 0.0,
    fmt: "%.2f",
};

/// Caller-supplied value-scale settings; every `None` falls back to a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScaleConfig {
    pub name: Option<String>,
    /// Registered colour map name, `_r` suffix allowed.
    pub color: Option<String>,
    /// Used instead of `color` when set.
    #[serde(skip)]
    pub colormap: Option<Colormap>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Number of colour-bar ticks to aim for.
    pub step: Option<usize>,
    /// Camera elevation in degrees.
    #[serde(alias = "vx")]
    pub elevation: Option<f64>,
    /// Camera azimuth in degrees.
    #[serde(alias = "vz")]
    pub azimuth: Option<f64>,
    /// Surface opacity.
    #[serde(alias = "a")]
    pub alpha: Option<f64>,
}

/// Value-scale settings with every key present.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedScaleConfig {
    pub name: String,
    pub colormap: Colormap,
    pub min: f64,
    pub max: f64,
    pub step: usize,
    pub elevation: f64,
    pub azimuth: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleDefaults {
    pub name: &'static str,
    pub color: &'static str,
    pub step: usize,
    pub elevation: f64,
    pub azimuth: f64,
    pub alpha: f64,
}

pub const SCALE_DEFAULTS: ScaleDefaults = ScaleDefaults {
    name: "z",
    color: "YlGnBu_r",
    step: 5,
    elevation: 45.0,
    azimuth: 15.0,
    alpha: 1.0,
};

/// Contour overlay drawn above the heatmap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourOverlayConfig {
    /// Maximum number of levels.
    pub count: usize,
    pub line_style: LineStrokeStyle,
    pub color: Color,
    pub label_format: NumberFormat,
    pub stroke_width: f64,
}

impl Default for ContourOverlayConfig {
    fn default() -> Self {
        Self {
            count: 5,
            line_style: LineStrokeStyle::Dashed,
            color: Color::WHITE,
            label_format: NumberFormat::fixed(1),
            stroke_width: 1.0,
        }
    }
}

/// Options of [`render_labeled_grid`].
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledGridOptions {
    pub row_axis: AxisLabelConfig,
    pub column_axis: AxisLabelConfig,
    pub scale: ScaleConfig,
    /// Reverse rows (and row coordinates and mask) so the first row ends up at
    /// the bottom of the view.
    pub flip_rows: bool,
    pub mask: Option<GridMask>,
    pub contours: Option<ContourOverlayConfig>,
    pub show_colorbar: bool,
}

impl Default for LabeledGridOptions {
    fn default() -> Self {
        Self {
            row_axis: AxisLabelConfig::default(),
            column_axis: AxisLabelConfig::default(),
            scale: ScaleConfig::default(),
            flip_rows: true,
            mask: None,
            contours: None,
            show_colorbar: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColorbarHandle {
    pub view: ViewId,
    pub value_min: f64,
    pub value_max: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LabeledGridHandle {
    pub view: ViewId,
    pub colorbar: Option<ColorbarHandle>,
}

/// Overlays `config` on the defaults for `axis`. Pure: neither the input nor
/// any shared default is modified.
pub fn resolve_axis_config(
    axis_coords: &[f64],
    config: &AxisLabelConfig,
    axis: GridAxis,
) -> FigureResult<ResolvedAxisConfig> {
    let defaults = AXIS_LABEL_DEFAULTS;
    let default_name = match axis {
        GridAxis::Rows => defaults.row_name,
        GridAxis::Columns => defaults.column_name,
    };
    let len = axis_coords.len();

    let resolved = ResolvedAxisConfig {
        name: config.name.clone().unwrap_or_else(|| default_name.to_owned()),
        step: config.step.unwrap_or(defaults.step),
        start: config.start.unwrap_or(defaults.start),
        end: config.end.unwrap_or(len),
        angle: config.angle.unwrap_or(defaults.angle),
        fmt: NumberFormat::parse(config.fmt.as_deref().unwrap_or(defaults.fmt))?,
    };

    if resolved.step == 0 {
        return Err(FigureError::InvalidArgument(format!(
            "{axis:?} label step must be > 0"
        )));
    }
    if resolved.start > resolved.end || resolved.end > len {
        return Err(FigureError::InvalidArgument(format!(
            "{axis:?} label range {}..{} must satisfy start <= end <= {len}",
            resolved.start, resolved.end
        )));
    }
    if !resolved.angle.is_finite() {
        return Err(FigureError::InvalidArgument(format!(
            "{axis:?} label angle must be finite"
        )));
    }
    Ok(resolved)
}

/// Overlays `config` on the scale defaults, taking `min`/`max` from the grid's
/// finite values when absent.
pub fn resolve_scale_config(grid: &ValueGrid, config: &ScaleConfig) -> FigureResult<ResolvedScaleConfig> {
    let defaults = SCALE_DEFAULTS;
    let data_range = grid.finite_range();
    let min = match (config.min, data_range) {
        (Some(min), _) => min,
        (None, Some((min, _))) => min,
        (None, None) => return Err(no_finite_values("min")),
    };
    let max = match (config.max, data_range) {
        (Some(max), _) => max,
        (None, Some((_, max))) => max,
        (None, None) => return Err(no_finite_values("max")),
    };
    if !min.is_finite() || !max.is_finite() || min > max {
        return Err(FigureError::InvalidArgument(format!(
            "scale range must be finite with min <= max, got [{min}, {max}]"
        )));
    }

    let colormap = match &config.colormap {
        Some(colormap) => colormap.clone(),
        None => Colormap::named(config.color.as_deref().unwrap_or(defaults.color))?,
    };

    let resolved = ResolvedScaleConfig {
        name: config.name.clone().unwrap_or_else(|| defaults.name.to_owned()),
        colormap,
        min,
        max,
        step: config.step.unwrap_or(defaults.step),
        elevation: config.elevation.unwrap_or(defaults.elevation),
        azimuth: config.azimuth.unwrap_or(defaults.azimuth),
        alpha: config.alpha.unwrap_or(defaults.alpha),
    };
    if resolved.step == 0 {
        return Err(FigureError::InvalidArgument(
            "scale step must be > 0".to_owned(),
        ));
    }
    if !resolved.elevation.is_finite() || !resolved.azimuth.is_finite() {
        return Err(FigureError::InvalidArgument(
            "view angles must be finite".to_owned(),
        ));
    }
    if !(0.0..=1.0).contains(&resolved.alpha) {
        return Err(FigureError::InvalidArgument(format!(
            "scale alpha must be in [0, 1], got {}",
            resolved.alpha
        )));
    }
    Ok(resolved)
}

fn no_finite_values(bound: &str) -> FigureError {
    FigureError::InvalidData(format!(
        "grid has no finite values to derive the scale {bound} from"
    ))
}

/// Draws `grid` as a heatmap into `target` (or the current view).
///
/// Rows run down the vertical axis with row 0 at the top, columns along the
/// horizontal axis; tick marks sit at cell centres.
///
/// The tick for index `i` is placed at `i + 0.5` in cell units, not on the
/// cell's leading edge at `i`.
pub fn render_labeled_grid(
    figure: &mut Figure,
    target: Option<ViewId>,
    row_coords: &[f64],
    column_coords: &[f64],
    grid: &ValueGrid,
    options: &LabeledGridOptions,
) -> FigureResult<LabeledGridHandle> {
    ensure_axis_len("row", row_coords.len(), grid.rows())?;
    ensure_axis_len("column", column_coords.len(), grid.columns())?;
    if let Some(mask) = &options.mask {
        mask.ensure_matches(grid)?;
    }

    let (grid, row_coords, mask) = if options.flip_rows {
        (
            grid.flipped_rows(),
            row_coords.iter().rev().copied().collect::<Vec<_>>(),
            options.mask.as_ref().map(GridMask::flipped_rows),
        )
    } else {
        (grid.clone(), row_coords.to_vec(), options.mask.clone())
    };

    let row_config = resolve_axis_config(&row_coords, &options.row_axis, GridAxis::Rows)?;
    let column_config = resolve_axis_config(column_coords, &options.column_axis, GridAxis::Columns)?;
    let scale = resolve_scale_config(&grid, &options.scale)?;

    let view_id = match target {
        Some(id) => {
            figure.view(id)?;
            id
        }
        None => figure.current_view(),
    };
    let unicode_minus = figure.style().unicode_minus;

    let row_ticks = sampled_ticks(&row_config, &row_coords, unicode_minus);
    let column_ticks = sampled_ticks(&column_config, column_coords, unicode_minus);
    let contour_overlay = options
        .contours
        .as_ref()
        .map(|config| contour_overlay(&grid, scale.min, scale.max, config, unicode_minus));

    let (rows, columns) = (grid.rows(), grid.columns());
    let view = figure.view_mut(view_id)?;
    view.set_heatmap(HeatmapLayer {
        grid,
        mask,
        colormap: scale.colormap.clone(),
        value_min: scale.min,
        value_max: scale.max,
    })?;
    view.set_x_limits(0.0, columns as f64)?;
    view.set_y_limits(0.0, rows as f64)?;
    view.set_y_inverted(true);
    view.set_tick_direction(Some(TickDirection::Out));
    view.set_y_ticks(Some(row_ticks));
    view.set_y_label(row_config.name.clone());
    view.set_x_ticks(Some(column_ticks));
    view.set_x_label(column_config.name.clone());

    let mut contour_count = 0;
    if let Some((lines, labels)) = contour_overlay {
        contour_count = lines.len();
        for line in lines {
            view.add_line(line)?;
        }
        for label in labels {
            view.add_text(label)?;
        }
    }

    let colorbar = if options.show_colorbar {
        view.set_colorbar(ColorbarSpec {
            colormap: scale.colormap.clone(),
            value_min: scale.min,
            value_max: scale.max,
            label: scale.name.clone(),
            tick_count: scale.step,
            shrink: 1.0,
        })?;
        Some(ColorbarHandle {
            view: view_id,
            value_min: scale.min,
            value_max: scale.max,
            label: scale.name.clone(),
        })
    } else {
        None
    };

    debug!(
        view = view_id.raw(),
        rows,
        columns,
        flip_rows = options.flip_rows,
        contour_lines = contour_count,
        colorbar = colorbar.is_some(),
        "rendered labeled grid"
    );
    Ok(LabeledGridHandle {
        view: view_id,
        colorbar,
    })
}

fn ensure_axis_len(axis: &str, coords: usize, cells: usize) -> FigureResult<()> {
    if coords != cells {
        return Err(FigureError::InvalidArgument(format!(
            "{axis} coordinates have {coords} entries but the grid has {cells} {axis}s"
        )));
    }
    Ok(())
}

fn sampled_ticks(config: &ResolvedAxisConfig, coords: &[f64], unicode_minus: bool) -> Vec<AxisTick> {
    config
        .indices()
        .map(|index| {
            AxisTick::new(
                index as f64 + 0.5,
                config.fmt.format(coords[index], unicode_minus),
            )
            .with_rotation(config.angle)
        })
        .collect()
}

/// Contour lines at cell centres plus one label per line at its middle point.
fn contour_overlay(
    grid: &ValueGrid,
    min: f64,
    max: f64,
    config: &ContourOverlayConfig,
    unicode_minus: bool,
) -> (Vec<DataLine>, Vec<DataText>) {
    let levels = contour_levels(min, max, config.count);
    let mut lines = Vec::new();
    let mut labels = Vec::new();
    for contour in trace_contours(grid, &levels) {
        if contour.points.len() < 2 {
            continue;
        }
        let points: Vec<DataPoint> = contour
            .points
            .iter()
            .map(|point| DataPoint::new(point.x + 0.5, point.y + 0.5))
            .collect();
        let middle = points[points.len() / 2];
        labels.push(DataText::new(
            middle,
            config.label_format.format(contour.level, unicode_minus),
            config.color,
        ));
        lines.push(
            DataLine::new(points, config.color)
                .with_stroke_style(config.line_style)
                .with_stroke_width(config.stroke_width),
        );
    }
    (lines, labels)
}
