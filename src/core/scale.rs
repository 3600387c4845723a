use crate::error::{FigureError, FigureResult};

/// Linear mapping between a data interval and a pixel interval.
///
/// The domain may be inverted (`domain_start > domain_end`); the mapping then
/// mirrors accordingly, which is how inverted axes are expressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain_start: f64,
    domain_end: f64,
}

impl LinearScale {
    pub fn new(domain_start: f64, domain_end: f64) -> FigureResult<Self> {
        if !domain_start.is_finite() || !domain_end.is_finite() || domain_start == domain_end {
            return Err(FigureError::InvalidData(
                "scale domain must be finite and non-zero".to_owned(),
            ));
        }

        Ok(Self {
            domain_start,
            domain_end,
        })
    }

    #[must_use]
    pub fn domain(self) -> (f64, f64) {
        (self.domain_start, self.domain_end)
    }

    #[must_use]
    pub fn domain_to_pixel(self, value: f64, pixel_start: f64, pixel_end: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        let normalized = (value - self.domain_start) / span;
        pixel_start + normalized * (pixel_end - pixel_start)
    }

    #[must_use]
    pub fn pixel_to_domain(self, pixel: f64, pixel_start: f64, pixel_end: f64) -> f64 {
        let span = self.domain_end - self.domain_start;
        let normalized = (pixel - pixel_start) / (pixel_end - pixel_start);
        self.domain_start + normalized * span
    }

    /// Whether `value` lies inside the domain (inclusive, orientation-agnostic).
    #[must_use]
    pub fn contains(self, value: f64) -> bool {
        let (lo, hi) = ordered(self.domain_start, self.domain_end);
        value >= lo && value <= hi
    }
}

/// Tick positions produced by [`nice_ticks`].
#[derive(Debug, Clone, PartialEq)]
pub struct NiceTicks {
    pub positions: Vec<f64>,
    pub step: f64,
}

/// Upper bound on generated ticks, reached only when `step` is below the
/// precision of the bounds.
const MAX_TICKS: usize = 1024;

/// "Nice number" ticks (1, 2, 5 × 10^k spacing) inside `[min, max]`.
///
/// Returns no positions for a degenerate or non-finite interval.
#[must_use]
pub fn nice_ticks(min: f64, max: f64, target_count: usize) -> NiceTicks {
    let (lo, hi) = ordered(min, max);
    if !lo.is_finite() || !hi.is_finite() || (hi - lo).abs() < f64::EPSILON {
        return NiceTicks {
            positions: Vec::new(),
            step: 0.0,
        };
    }

    // Halving first keeps the span finite for bounds near f64::MAX.
    let half_span = hi / 2.0 - lo / 2.0;
    let rough_step = half_span / (target_count.max(2) - 1) as f64 * 2.0;
    let step = nice_step(rough_step);
    if !step.is_finite() || step <= 0.0 {
        return NiceTicks {
            positions: Vec::new(),
            step: 0.0,
        };
    }
    let first = (lo / step).ceil() * step;
    let tolerance = step * 1e-9;

    let mut positions = Vec::new();
    let mut index = 0_u32;
    while positions.len() < MAX_TICKS {
        let value = first + f64::from(index) * step;
        if !value.is_finite() || value > hi + tolerance {
            break;
        }
        // Snap values that should be zero so labels never read "-0.00".
        positions.push(if value.abs() < tolerance { 0.0 } else { value });
        index += 1;
    }

    NiceTicks { positions, step }
}

pub(crate) fn nice_step(rough: f64) -> f64 {
    let exponent = rough.abs().log10().floor();
    let fraction = rough / 10.0_f64.powf(exponent);
    let nice_fraction = if fraction <= 1.5 {
        1.0
    } else if fraction <= 3.5 {
        2.0
    } else if fraction <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice_fraction * 10.0_f64.powf(exponent)
}

/// Decimal places that make labels of a tick step distinguishable.
#[must_use]
pub fn decimals_for_step(step: f64) -> usize {
    if !step.is_finite() || step <= 0.0 || step >= 1.0 {
        return 0;
    }
    (-step.log10().floor()).max(0.0) as usize
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}
