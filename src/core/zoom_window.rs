use serde::{Deserialize, Serialize};

use crate::error::{FigureError, FigureResult};

/// Rectangular zoom window in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomWindow {
    pub x_left: f64,
    pub x_right: f64,
    pub y_bottom: f64,
    pub y_top: f64,
}

impl ZoomWindow {
    /// Closed outline: bottom-left, bottom-right, top-right, top-left, bottom-left.
    #[must_use]
    pub fn outline(self) -> [(f64, f64); 5] {
        [
            (self.x_left, self.y_bottom),
            (self.x_right, self.y_bottom),
            (self.x_right, self.y_top),
            (self.x_left, self.y_top),
            (self.x_left, self.y_bottom),
        ]
    }
}

/// Computes the padded zoom window around `coords[range_start..=range_end]`.
///
/// The x extent spans `coords[range_start]..coords[range_end]`; the y extent is
/// the min/max over `series[i][range_start..range_end]` of every series. Both
/// are widened by their span times the matching padding ratio on each side.
pub fn compute_zoom_window<S: AsRef<[f64]>>(
    coords: &[f64],
    series: &[S],
    range_start: usize,
    range_end: usize,
    x_padding_ratio: f64,
    y_padding_ratio: f64,
) -> FigureResult<ZoomWindow> {
    if range_start >= range_end {
        return Err(FigureError::InvalidRange(format!(
            "range start {range_start} must be lower than range end {range_end}"
        )));
    }
    if range_end >= coords.len() {
        return Err(FigureError::InvalidRange(format!(
            "range end {range_end} is outside an axis of {} samples",
            coords.len()
        )));
    }
    if series.is_empty() {
        return Err(FigureError::InvalidArgument(
            "at least one dependent series is required".to_owned(),
        ));
    }
    for (name, ratio) in [("x", x_padding_ratio), ("y", y_padding_ratio)] {
        if !ratio.is_finite() || ratio < 0.0 {
            return Err(FigureError::InvalidArgument(format!(
                "{name} padding ratio must be finite and >= 0"
            )));
        }
    }

    let mut y_min = f64::INFINITY;
    let mut y_max = f64::NEG_INFINITY;
    for (index, values) in series.iter().enumerate() {
        let values = values.as_ref();
        if values.len() != coords.len() {
            return Err(FigureError::InvalidArgument(format!(
                "series {index} has {} samples, axis has {}",
                values.len(),
                coords.len()
            )));
        }
        for &value in &values[range_start..range_end] {
            if !value.is_finite() {
                return Err(FigureError::InvalidData(format!(
                    "series {index} holds a non-finite value inside the zoom range"
                )));
            }
            y_min = y_min.min(value);
            y_max = y_max.max(value);
        }
    }

    let x_start = coords[range_start];
    let x_end = coords[range_end];
    if !x_start.is_finite() || !x_end.is_finite() {
        return Err(FigureError::InvalidData(
            "zoom range coordinates must be finite".to_owned(),
        ));
    }

    let x_span = x_end - x_start;
    let y_span = y_max - y_min;
    Ok(ZoomWindow {
        x_left: x_start - x_span * x_padding_ratio,
        x_right: x_end + x_span * x_padding_ratio,
        y_bottom: y_min - y_span * y_padding_ratio,
        y_top: y_max + y_span * y_padding_ratio,
    })
}
