//! Colour lists sampled from colour maps, custom gradient maps and a
//! preview figure for judging a palette.

use std::f64::consts::PI;

use tracing::debug;

use crate::api::figure::{Figure, SubplotParams};
use crate::api::style::StyleContext;
use crate::api::view::{AxisTick, DataLine, DataPolygon, GridLines, GridSpan, GridSpec, MarkerSeries};
use crate::core::{DataPoint, linspace, nice_ticks};
use crate::error::{FigureError, FigureResult};
use crate::render::{Color, Colormap, LineStrokeStyle};

pub const CSL_4_1: &[&str] = &["#384259", "#f73859", "#7ac7c4", "#f07b3f"];
pub const CSL_4_2: &[&str] = &["#2a557f", "#44bd9d", "#f04f75", "#fdcd6e"];
pub const CSL_2_1: &[&str] = &["#b7282e", "#0f1021"];

/// Samples default to this many evenly spaced positions.
pub const DEFAULT_PALETTE_SAMPLES: usize = 5;

/// Parses a list of colour specs such as [`CSL_4_1`].
pub fn palette_colors(specs: &[&str]) -> FigureResult<Vec<Color>> {
    specs.iter().map(|spec| Color::parse(spec)).collect()
}

/// Colours of the registered map `name` at normalized `positions`.
pub fn sample_colormap(name: &str, positions: &[f64]) -> FigureResult<Vec<Color>> {
    if positions.iter().any(|position| !position.is_finite()) {
        return Err(FigureError::InvalidArgument(
            "colormap positions must be finite".to_owned(),
        ));
    }
    let colors = Colormap::named(name)?.sample(positions);
    debug!(colormap = name, count = colors.len(), "sampled colormap");
    Ok(colors)
}

/// Gradient through `colors` quantized to `levels`, plus `samples` colours
/// taken evenly from it.
pub fn custom_colormap(colors: &[Color], levels: usize, samples: usize) -> FigureResult<(Colormap, Vec<Color>)> {
    let colormap = Colormap::from_colors("custom", colors, levels)?;
    let sampled = colormap.sample(&linspace(0.0, 1.0, samples));
    Ok((colormap, sampled))
}

/// Black through crimson to white in 1000 steps.
pub fn custom_dark_red_white() -> FigureResult<(Colormap, Vec<Color>)> {
    let colors = palette_colors(&["k", "#b7282e", "w"])?;
    custom_colormap(&colors, 1000, DEFAULT_PALETTE_SAMPLES)
}

/// Figure showing `colors` as swatches, as sine curves and as hollow
/// square markers along exponential curves.
pub fn palette_preview(colors: &[Color], style: StyleContext) -> FigureResult<Figure> {
    if colors.is_empty() {
        return Err(FigureError::InvalidArgument(
            "palette preview needs at least one color".to_owned(),
        ));
    }
    let count = colors.len();
    let side_columns = (count / 2).max(1);
    let spec = GridSpec::new(3, count + side_columns)?;

    let mut figure = Figure::new(6.0, 4.0, style)?;
    figure.set_subplot_params(SubplotParams {
        wspace: 0.3,
        hspace: 0.2,
        ..SubplotParams::default()
    })?;

    for (index, &color) in colors.iter().enumerate() {
        let swatch = figure.add_grid_view(spec, GridSpan::cell(0, index))?;
        let view = figure.view_mut(swatch)?;
        view.set_axis_visible(false);
        view.set_x_limits(0.0, 1.0)?;
        view.set_y_limits(0.0, 1.0)?;
        let square = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .into_iter()
            .map(|(x, y)| DataPoint::new(x, y))
            .collect();
        view.add_polygon(DataPolygon::new(square, color))?;
    }

    let waves = figure.add_grid_view(spec, GridSpan::new(1..3, 0..count))?;
    let view = figure.view_mut(waves)?;
    let xs: Vec<f64> = (0_u32..)
        .map(|step| f64::from(step) * 0.1)
        .take_while(|&x| x < 2.0 * PI)
        .collect();
    for (index, &color) in colors.iter().enumerate() {
        let frequency = index as f64 + 0.5;
        let ys: Vec<f64> = xs.iter().map(|x| (frequency * x).sin()).collect();
        view.add_line(DataLine::from_xy(&xs, &ys, color).with_label(index.to_string()))?;
    }
    view.set_grid_lines(Some(GridLines {
        stroke_style: LineStrokeStyle::Dotted,
        color: Color::BLACK.with_alpha(0.3),
    }));
    let ((x_min, x_max), (y_min, y_max)) = view.resolved_limits();
    view.set_x_ticks(Some(unlabelled_ticks(x_min, x_max)));
    view.set_y_ticks(Some(unlabelled_ticks(y_min, y_max)));

    let growth = figure.add_grid_view(spec, GridSpan::new(0..3, count..count + side_columns))?;
    let view = figure.view_mut(growth)?;
    let xs: Vec<f64> = (0_u32..10).map(|step| f64::from(step) * 0.05).collect();
    for (index, &color) in colors.iter().enumerate() {
        let rate = index as f64 + 0.5;
        view.add_markers(MarkerSeries {
            points: xs.iter().map(|&x| DataPoint::new(x, (rate * x).exp())).collect(),
            color,
            size: 6.0,
            filled: false,
        })?;
    }
    view.set_x_ticks(Some(Vec::new()));
    view.set_y_ticks(Some(Vec::new()));

    debug!(colors = count, "built palette preview");
    Ok(figure)
}

fn unlabelled_ticks(min: f64, max: f64) -> Vec<AxisTick> {
    nice_ticks(min, max, 6)
        .positions
        .into_iter()
        .map(|position| AxisTick::new(position, ""))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_palettes_parse() {
        assert_eq!(palette_colors(CSL_4_1).expect("4-1").len(), 4);
        assert_eq!(palette_colors(CSL_2_1).expect("2-1")[0], Color::rgb8(0xb7, 0x28, 0x2e));
    }

    #[test]
    fn custom_map_samples_span_both_ends() {
        let (_, samples) = custom_dark_red_white().expect("map");
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[0].to_hex(), "#000000");
        assert_eq!(samples[4].to_hex(), "#ffffff");
    }

    #[test]
    fn preview_has_swatches_waves_and_markers() {
        let colors = palette_colors(CSL_4_2).expect("colors");
        let figure = palette_preview(&colors, StyleContext::default()).expect("preview");
        let views = figure.views();
        assert_eq!(views.len(), 6);
        assert!(views[..4].iter().all(|view| !view.is_axis_visible()));
        assert_eq!(views[4].lines().len(), 4);
        assert_eq!(views[4].lines()[0].points.len(), 63);
        assert_eq!(views[5].markers().len(), 4);
        assert_eq!(views[5].x_ticks().map(<[AxisTick]>::len), Some(0));
    }

    #[test]
    fn empty_palette_is_rejected() {
        assert!(palette_preview(&[], StyleContext::default()).is_err());
    }
}
