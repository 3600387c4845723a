//! Least-squares polynomials and interpolating splines.
//!
//! Linear algebra is delegated to `nalgebra`; this module only assembles the
//! systems and evaluates the resulting models.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{FigureError, FigureResult};

/// Polynomial with coefficients stored lowest power first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    #[must_use]
    pub fn from_coefficients(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    /// Least-squares fit of a polynomial of `degree` through `(xs, ys)`.
    pub fn fit(xs: &[f64], ys: &[f64], degree: usize) -> FigureResult<Self> {
        ensure_paired(xs, ys)?;
        if xs.len() <= degree {
            return Err(FigureError::InvalidData(format!(
                "a degree-{degree} polynomial needs at least {} samples, got {}",
                degree + 1,
                xs.len()
            )));
        }

        let columns = degree + 1;
        let vandermonde = DMatrix::from_fn(xs.len(), columns, |row, column| {
            xs[row].powi(column as i32)
        });
        let rhs = DVector::from_column_slice(ys);
        let solution = vandermonde
            .svd(true, true)
            .solve(&rhs, 1e-12)
            .map_err(|err| FigureError::InvalidData(format!("polynomial fit failed: {err}")))?;

        Ok(Self {
            coefficients: solution.iter().copied().collect(),
        })
    }

    /// Coefficients, lowest power first.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    #[must_use]
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &coefficient| acc * x + coefficient)
    }
}

/// Interpolation order supported by [`Spline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SplineOrder {
    Linear,
    #[default]
    Cubic,
}

/// Interpolating spline through strictly increasing knots.
///
/// The cubic variant uses natural boundary conditions (zero second
/// derivative at both ends). Evaluation outside the knot range extrapolates
/// the first/last piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spline {
    order: SplineOrder,
    knots: Vec<f64>,
    values: Vec<f64>,
    second_derivatives: Vec<f64>,
}

impl Spline {
    pub fn fit(xs: &[f64], ys: &[f64], order: SplineOrder) -> FigureResult<Self> {
        ensure_paired(xs, ys)?;
        let minimum = match order {
            SplineOrder::Linear => 2,
            SplineOrder::Cubic => 3,
        };
        if xs.len() < minimum {
            return Err(FigureError::InvalidData(format!(
                "{order:?} spline needs at least {minimum} samples, got {}",
                xs.len()
            )));
        }
        if xs.windows(2).any(|pair| pair[1] <= pair[0]) {
            return Err(FigureError::InvalidData(
                "spline knots must be strictly increasing".to_owned(),
            ));
        }

        let second_derivatives = match order {
            SplineOrder::Linear => vec![0.0; xs.len()],
            SplineOrder::Cubic => natural_second_derivatives(xs, ys)?,
        };

        Ok(Self {
            order,
            knots: xs.to_vec(),
            values: ys.to_vec(),
            second_derivatives,
        })
    }

    #[must_use]
    pub fn order(&self) -> SplineOrder {
        self.order
    }

    #[must_use]
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        let last = self.knots.len() - 1;
        let segment = match self.knots.partition_point(|&knot| knot <= x) {
            0 => 0,
            index if index > last => last - 1,
            index => index - 1,
        };

        let x0 = self.knots[segment];
        let x1 = self.knots[segment + 1];
        let y0 = self.values[segment];
        let y1 = self.values[segment + 1];
        let h = x1 - x0;
        let a = (x1 - x) / h;
        let b = (x - x0) / h;

        let linear = a * y0 + b * y1;
        match self.order {
            SplineOrder::Linear => linear,
            SplineOrder::Cubic => {
                let m0 = self.second_derivatives[segment];
                let m1 = self.second_derivatives[segment + 1];
                linear + ((a.powi(3) - a) * m0 + (b.powi(3) - b) * m1) * h * h / 6.0
            }
        }
    }
}

fn natural_second_derivatives(xs: &[f64], ys: &[f64]) -> FigureResult<Vec<f64>> {
    let n = xs.len();
    let mut system = DMatrix::<f64>::zeros(n, n);
    let mut rhs = DVector::<f64>::zeros(n);
    system[(0, 0)] = 1.0;
    system[(n - 1, n - 1)] = 1.0;

    for i in 1..n - 1 {
        let h0 = xs[i] - xs[i - 1];
        let h1 = xs[i + 1] - xs[i];
        system[(i, i - 1)] = h0;
        system[(i, i)] = 2.0 * (h0 + h1);
        system[(i, i + 1)] = h1;
        rhs[i] = 6.0 * ((ys[i + 1] - ys[i]) / h1 - (ys[i] - ys[i - 1]) / h0);
    }

    system
        .lu()
        .solve(&rhs)
        .map(|solution| solution.iter().copied().collect())
        .ok_or_else(|| FigureError::InvalidData("spline system is singular".to_owned()))
}

/// `count` evenly spaced values from `start` to `end` inclusive.
#[must_use]
pub fn linspace(start: f64, end: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (count - 1) as f64;
            (0..count)
                .map(|index| {
                    if index == count - 1 {
                        end
                    } else {
                        start + step * index as f64
                    }
                })
                .collect()
        }
    }
}

/// Values at indices `offset, offset + stride, …`.
#[must_use]
pub fn downsample(values: &[f64], offset: usize, stride: usize) -> Vec<f64> {
    values
        .iter()
        .skip(offset)
        .step_by(stride.max(1))
        .copied()
        .collect()
}

fn ensure_paired(xs: &[f64], ys: &[f64]) -> FigureResult<()> {
    if xs.len() != ys.len() {
        return Err(FigureError::InvalidArgument(format!(
            "x and y must have equal length, got {} and {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.iter().chain(ys).any(|value| !value.is_finite()) {
        return Err(FigureError::InvalidData(
            "fit samples must be finite".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn quadratic_fit_recovers_coefficients() {
        let xs = linspace(-2.0, 3.0, 12);
        let ys: Vec<f64> = xs.iter().map(|x| 0.5 * x * x - x + 4.0).collect();
        let poly = Polynomial::fit(&xs, &ys, 2).expect("fit");
        assert_abs_diff_eq!(poly.coefficients()[0], 4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(poly.coefficients()[1], -1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(poly.coefficients()[2], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn underdetermined_fit_is_rejected() {
        let err = Polynomial::fit(&[1.0, 2.0], &[1.0, 2.0], 2).expect_err("too few");
        assert!(matches!(err, FigureError::InvalidData(_)));
    }

    #[test]
    fn cubic_spline_interpolates_knots() {
        let xs = [0.0, 1.0, 2.5, 4.0, 5.0];
        let ys = [1.0, -2.0, 0.5, 3.0, 2.0];
        let spline = Spline::fit(&xs, &ys, SplineOrder::Cubic).expect("spline");
        for (x, y) in xs.iter().zip(ys) {
            assert_abs_diff_eq!(spline.evaluate(*x), y, epsilon = 1e-9);
        }
    }

    #[test]
    fn linear_spline_is_piecewise_linear() {
        let spline = Spline::fit(&[0.0, 2.0, 4.0], &[0.0, 4.0, 0.0], SplineOrder::Linear)
            .expect("spline");
        assert_abs_diff_eq!(spline.evaluate(1.0), 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(spline.evaluate(3.0), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn spline_rejects_unsorted_knots() {
        let err = Spline::fit(&[0.0, 2.0, 1.0], &[0.0, 1.0, 2.0], SplineOrder::Cubic)
            .expect_err("unsorted");
        assert!(matches!(err, FigureError::InvalidData(_)));
    }

    #[test]
    fn linspace_hits_both_ends() {
        let values = linspace(1.0, 2.0, 5);
        assert_eq!(values.len(), 5);
        assert_eq!(values[0], 1.0);
        assert_eq!(values[4], 2.0);
    }

    #[test]
    fn downsample_starts_at_offset() {
        assert_eq!(downsample(&[0.0, 1.0, 2.0, 3.0, 4.0], 1, 2), vec![1.0, 3.0]);
    }
}
