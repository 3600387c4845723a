use serde::{Deserialize, Serialize};

use crate::core::types::DataPoint;

/// Point in the normalized surface box (each axis spans `[-0.5, 0.5]`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl BoxPoint {
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Orthographic camera looking at the unit box from `elevation`/`azimuth`
/// degrees, the same angle convention as common 3-D plotting front-ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrthoCamera {
    eye: [f64; 3],
    right: [f64; 3],
    up: [f64; 3],
}

impl OrthoCamera {
    #[must_use]
    pub fn new(elevation_deg: f64, azimuth_deg: f64) -> Self {
        let elevation = elevation_deg.to_radians();
        let azimuth = azimuth_deg.to_radians();
        let (sin_e, cos_e) = elevation.sin_cos();
        let (sin_a, cos_a) = azimuth.sin_cos();
        Self {
            eye: [cos_e * cos_a, cos_e * sin_a, sin_e],
            right: [-sin_a, cos_a, 0.0],
            up: [-sin_e * cos_a, -sin_e * sin_a, cos_e],
        }
    }

    /// Screen position of a box point (unitless, roughly within `[-0.9, 0.9]`).
    #[must_use]
    pub fn project(self, point: BoxPoint) -> DataPoint {
        DataPoint::new(dot(self.right, point), dot(self.up, point))
    }

    /// Distance toward the viewer; larger values are closer.
    #[must_use]
    pub fn depth(self, point: BoxPoint) -> f64 {
        dot(self.eye, point)
    }
}

/// Maps `value` from `[min, max]` onto `[-0.5, 0.5]`; a degenerate range maps to 0.
#[must_use]
pub fn normalize_to_box(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if !span.is_finite() || span.abs() < f64::EPSILON {
        return 0.0;
    }
    (value - min) / span - 0.5
}

fn dot(axis: [f64; 3], point: BoxPoint) -> f64 {
    axis[0] * point.x + axis[1] * point.y + axis[2] * point.z
}
