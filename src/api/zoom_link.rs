//! Inset-zoom helper: applies a zoom window to an inset view, outlines the
//! window on the primary view and links the two with connector segments.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::api::figure::{Connector, Figure};
use crate::api::view::{DataLine, ViewId};
use crate::core::{DataPoint, ZoomWindow, compute_zoom_window};
use crate::error::{FigureError, FigureResult};
use crate::render::Color;

/// Side of the zoom window the connectors leave from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkEdge {
    #[default]
    Bottom,
    Top,
    Left,
    Right,
}

impl LinkEdge {
    pub const ALL: [Self; 4] = [Self::Bottom, Self::Top, Self::Left, Self::Right];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bottom => "bottom",
            Self::Top => "top",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// The two `(inset corner, primary corner)` pairs joined by connectors.
    #[must_use]
    pub fn connector_pairs(self, window: ZoomWindow) -> [(DataPoint, DataPoint); 2] {
        let ZoomWindow {
            x_left: left,
            x_right: right,
            y_bottom: bottom,
            y_top: top,
        } = window;
        let point = DataPoint::new;
        match self {
            Self::Bottom => [
                (point(left, top), point(left, bottom)),
                (point(right, top), point(right, bottom)),
            ],
            Self::Top => [
                (point(left, bottom), point(left, top)),
                (point(right, bottom), point(right, top)),
            ],
            Self::Left => [
                (point(right, top), point(left, top)),
                (point(right, bottom), point(left, bottom)),
            ],
            Self::Right => [
                (point(left, top), point(right, top)),
                (point(left, bottom), point(right, bottom)),
            ],
        }
    }
}

impl FromStr for LinkEdge {
    type Err = FigureError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|edge| edge.as_str() == tag)
            .ok_or_else(|| {
                FigureError::InvalidArgument(format!(
                    "unknown link edge `{tag}`, expected one of bottom, top, left, right"
                ))
            })
    }
}

impl fmt::Display for LinkEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Inputs of [`zone_and_link`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomLinkConfig {
    pub range_start: usize,
    pub range_end: usize,
    pub link_edge: LinkEdge,
    pub x_padding_ratio: f64,
    pub y_padding_ratio: f64,
    pub frame_color: Color,
    pub connector_color: Color,
    pub stroke_width: f64,
}

impl Default for ZoomLinkConfig {
    fn default() -> Self {
        Self {
            range_start: 0,
            range_end: 0,
            link_edge: LinkEdge::Bottom,
            x_padding_ratio: 0.05,
            y_padding_ratio: 0.05,
            frame_color: Color::BLACK,
            connector_color: Color::BLACK,
            stroke_width: 1.0,
        }
    }
}

impl ZoomLinkConfig {
    #[must_use]
    pub fn new(range_start: usize, range_end: usize) -> Self {
        Self {
            range_start,
            range_end,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_link_edge(mut self, link_edge: LinkEdge) -> Self {
        self.link_edge = link_edge;
        self
    }

    #[must_use]
    pub fn with_padding(mut self, x_padding_ratio: f64, y_padding_ratio: f64) -> Self {
        self.x_padding_ratio = x_padding_ratio;
        self.y_padding_ratio = y_padding_ratio;
        self
    }
}

/// Zooms `inset` onto the window, outlines it on `primary` in black and draws
/// the two connectors for `link_edge`.
pub fn draw_zoom_frame_and_links(
    figure: &mut Figure,
    primary: ViewId,
    inset: ViewId,
    window: ZoomWindow,
    link_edge: LinkEdge,
) -> FigureResult<()> {
    let style = LinkStyle {
        frame_color: Color::BLACK,
        connector_color: Color::BLACK,
        stroke_width: 1.0,
    };
    draw_styled(figure, primary, inset, window, link_edge, style)
}

/// Computes the zoom window of `config`'s index range and draws frame and links.
pub fn zone_and_link<S: AsRef<[f64]>>(
    figure: &mut Figure,
    primary: ViewId,
    inset: ViewId,
    coords: &[f64],
    series: &[S],
    config: &ZoomLinkConfig,
) -> FigureResult<ZoomWindow> {
    let window = compute_zoom_window(
        coords,
        series,
        config.range_start,
        config.range_end,
        config.x_padding_ratio,
        config.y_padding_ratio,
    )?;
    let style = LinkStyle {
        frame_color: config.frame_color,
        connector_color: config.connector_color,
        stroke_width: config.stroke_width,
    };
    draw_styled(figure, primary, inset, window, config.link_edge, style)?;
    Ok(window)
}

#[derive(Debug, Clone, Copy)]
struct LinkStyle {
    frame_color: Color,
    connector_color: Color,
    stroke_width: f64,
}

fn draw_styled(
    figure: &mut Figure,
    primary: ViewId,
    inset: ViewId,
    window: ZoomWindow,
    link_edge: LinkEdge,
    style: LinkStyle,
) -> FigureResult<()> {
    figure.view(primary)?;
    figure.view(inset)?;
    if primary == inset {
        return Err(FigureError::InvalidArgument(
            "primary and inset must be different views".to_owned(),
        ));
    }
    if !style.stroke_width.is_finite() || style.stroke_width <= 0.0 {
        return Err(FigureError::InvalidArgument(
            "zoom frame stroke width must be finite and > 0".to_owned(),
        ));
    }
    style.frame_color.validate()?;
    style.connector_color.validate()?;

    let (x_left, x_right) = non_degenerate("x", window.x_left, window.x_right)?;
    let (y_bottom, y_top) = non_degenerate("y", window.y_bottom, window.y_top)?;
    let inset_view = figure.view_mut(inset)?;
    inset_view.set_x_limits(x_left, x_right)?;
    inset_view.set_y_limits(y_bottom, y_top)?;

    let outline = window
        .outline()
        .into_iter()
        .map(|(x, y)| DataPoint::new(x, y))
        .collect();
    figure.view_mut(primary)?.add_line(
        DataLine::new(outline, style.frame_color).with_stroke_width(style.stroke_width),
    )?;

    for (inset_corner, primary_corner) in link_edge.connector_pairs(window) {
        figure.add_connector(Connector {
            from_view: inset,
            from: inset_corner,
            to_view: primary,
            to: primary_corner,
            color: style.connector_color,
            stroke_width: style.stroke_width,
        })?;
    }

    debug!(
        primary = primary.raw(),
        inset = inset.raw(),
        link_edge = %link_edge,
        x_left = window.x_left,
        x_right = window.x_right,
        y_bottom = window.y_bottom,
        y_top = window.y_top,
        "linked zoom window"
    );
    Ok(())
}

/// Inset limits for one axis; a zero-width window is widened so the inset
/// stays drawable.
fn non_degenerate(axis: &str, low: f64, high: f64) -> FigureResult<(f64, f64)> {
    if !low.is_finite() || !high.is_finite() {
        return Err(FigureError::InvalidData(format!(
            "zoom window {axis} bounds must be finite"
        )));
    }
    if low != high {
        return Ok((low, high));
    }
    let pad = if low.abs() > f64::EPSILON { low.abs() * 0.05 } else { 0.5 };
    warn!(axis, value = low, pad, "zoom window has zero extent, widening inset limits");
    Ok((low - pad, high + pad))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_tags_only() {
        assert_eq!("left".parse::<LinkEdge>().expect("left"), LinkEdge::Left);
        let err = "diagonal".parse::<LinkEdge>().expect_err("unknown");
        assert!(matches!(err, FigureError::InvalidArgument(_)));
    }

    #[test]
    fn bottom_edge_runs_from_top_corners_to_bottom_corners() {
        let window = ZoomWindow {
            x_left: 1.0,
            x_right: 2.0,
            y_bottom: 3.0,
            y_top: 4.0,
        };
        let [first, second] = LinkEdge::Bottom.connector_pairs(window);
        assert_eq!(first, (DataPoint::new(1.0, 4.0), DataPoint::new(1.0, 3.0)));
        assert_eq!(second, (DataPoint::new(2.0, 4.0), DataPoint::new(2.0, 3.0)));
    }

    #[test]
    fn degenerate_extent_is_widened() {
        assert_eq!(non_degenerate("y", 2.0, 2.0).expect("widened"), (1.9, 2.1));
        assert_eq!(non_degenerate("y", 0.0, 0.0).expect("widened"), (-0.5, 0.5));
    }
}
