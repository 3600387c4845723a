use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::figure::Figure;
use crate::api::view::{DataLine, ViewId};
use crate::core::{DataPoint, Polynomial, Spline, SplineOrder, downsample, finite_min_max, linspace};
use crate::error::{FigureError, FigureResult};
use crate::render::Color;

/// Down-sampling of the input samples before fitting: indices
/// `offset, offset + stride, …`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitSampling {
    pub stride: usize,
    /// The first sample is skipped by default.
    pub offset: usize,
}

impl Default for FitSampling {
    fn default() -> Self {
        Self {
            stride: 1,
            offset: 1,
        }
    }
}

impl FitSampling {
    /// Keeps every sample.
    pub const ALL: Self = Self {
        stride: 1,
        offset: 0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplineOptions {
    /// Number of evenly spaced abscissae the curve is evaluated on.
    pub points: usize,
    pub order: SplineOrder,
    pub sampling: FitSampling,
    /// Fit `x` as a function of `y` and draw the curve swapped back.
    pub swap_axes: bool,
    pub color: Color,
    pub label: String,
}

impl Default for SplineOptions {
    fn default() -> Self {
        Self {
            points: 1000,
            order: SplineOrder::Cubic,
            sampling: FitSampling::default(),
            swap_axes: false,
            color: Color::GRAY,
            label: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolyfitOptions {
    pub points: usize,
    pub degree: usize,
    pub sampling: FitSampling,
    pub swap_axes: bool,
    /// Abscissae to evaluate on instead of the dense grid.
    pub eval_at: Option<Vec<f64>>,
    pub color: Color,
    pub label: String,
}

impl Default for PolyfitOptions {
    fn default() -> Self {
        Self {
            points: 1000,
            degree: 3,
            sampling: FitSampling::default(),
            swap_axes: false,
            eval_at: None,
            color: Color::GRAY,
            label: String::new(),
        }
    }
}

/// A fitted model with the curve evaluated from it.
///
/// `xs`/`ys` are in the fitting frame, i.e. already swapped when
/// `swap_axes` was requested.
#[derive(Debug, Clone, PartialEq)]
pub struct FittedCurve<M> {
    pub model: M,
    pub xs: Vec<f64>,
    pub ys: Vec<f64>,
    pub swapped: bool,
}

impl<M> FittedCurve<M> {
    /// Curve points in the caller's original axis orientation.
    #[must_use]
    pub fn plot_points(&self) -> Vec<DataPoint> {
        self.xs
            .iter()
            .zip(&self.ys)
            .map(|(&x, &y)| {
                if self.swapped {
                    DataPoint::new(y, x)
                } else {
                    DataPoint::new(x, y)
                }
            })
            .collect()
    }
}

/// Fits an interpolating spline and evaluates it on a dense grid spanning
/// the sample range.
pub fn fit_spline_curve(xs: &[f64], ys: &[f64], options: &SplineOptions) -> FigureResult<FittedCurve<Spline>> {
    ensure_point_count(options.points)?;
    let (mut sample_x, mut sample_y) = prepare_samples(xs, ys, options.sampling, options.swap_axes)?;
    sort_by_abscissa(&mut sample_x, &mut sample_y);
    if sample_x.windows(2).any(|pair| pair[0] == pair[1]) {
        return Err(FigureError::InvalidData(
            "spline abscissae must be distinct".to_owned(),
        ));
    }

    let spline = Spline::fit(&sample_x, &sample_y, options.order)?;
    let curve_x = dense_grid(&sample_x, options.points)?;
    let curve_y = curve_x.iter().map(|&x| spline.evaluate(x)).collect();
    debug!(
        samples = sample_x.len(),
        order = ?options.order,
        points = options.points,
        "fitted spline"
    );

    Ok(FittedCurve {
        model: spline,
        xs: curve_x,
        ys: curve_y,
        swapped: options.swap_axes,
    })
}

/// Least-squares polynomial fit, evaluated on `eval_at` or a dense grid.
pub fn fit_polynomial_curve(
    xs: &[f64],
    ys: &[f64],
    options: &PolyfitOptions,
) -> FigureResult<FittedCurve<Polynomial>> {
    let (sample_x, sample_y) = prepare_samples(xs, ys, options.sampling, options.swap_axes)?;
    let polynomial = Polynomial::fit(&sample_x, &sample_y, options.degree)?;

    let curve_x = match &options.eval_at {
        Some(eval_at) => {
            if eval_at.iter().any(|value| !value.is_finite()) {
                return Err(FigureError::InvalidData(
                    "evaluation abscissae must be finite".to_owned(),
                ));
            }
            eval_at.clone()
        }
        None => {
            ensure_point_count(options.points)?;
            dense_grid(&sample_x, options.points)?
        }
    };
    let curve_y = curve_x.iter().map(|&x| polynomial.evaluate(x)).collect();
    debug!(
        samples = sample_x.len(),
        degree = options.degree,
        points = curve_x.len(),
        "fitted polynomial"
    );

    Ok(FittedCurve {
        model: polynomial,
        xs: curve_x,
        ys: curve_y,
        swapped: options.swap_axes,
    })
}

/// Fits a spline and draws it into `view` (or the current view).
pub fn spline_overlay(
    figure: &mut Figure,
    view: Option<ViewId>,
    xs: &[f64],
    ys: &[f64],
    options: &SplineOptions,
) -> FigureResult<FittedCurve<Spline>> {
    let curve = fit_spline_curve(xs, ys, options)?;
    draw_curve(figure, view, &curve, options.color, &options.label)?;
    Ok(curve)
}

/// Fits a polynomial and draws it into `view` (or the current view).
pub fn polyfit_overlay(
    figure: &mut Figure,
    view: Option<ViewId>,
    xs: &[f64],
    ys: &[f64],
    options: &PolyfitOptions,
) -> FigureResult<FittedCurve<Polynomial>> {
    let curve = fit_polynomial_curve(xs, ys, options)?;
    draw_curve(figure, view, &curve, options.color, &options.label)?;
    Ok(curve)
}

fn draw_curve<M>(
    figure: &mut Figure,
    view: Option<ViewId>,
    curve: &FittedCurve<M>,
    color: Color,
    label: &str,
) -> FigureResult<()> {
    let view = match view {
        Some(id) => id,
        None => figure.current_view(),
    };
    figure
        .view_mut(view)?
        .add_line(DataLine::new(curve.plot_points(), color).with_label(label))
}

fn prepare_samples(
    xs: &[f64],
    ys: &[f64],
    sampling: FitSampling,
    swap_axes: bool,
) -> FigureResult<(Vec<f64>, Vec<f64>)> {
    if xs.len() != ys.len() {
        return Err(FigureError::InvalidArgument(format!(
            "x and y must have equal length, got {} and {}",
            xs.len(),
            ys.len()
        )));
    }
    if sampling.stride == 0 {
        return Err(FigureError::InvalidArgument(
            "sampling stride must be > 0".to_owned(),
        ));
    }
    let (xs, ys) = if swap_axes { (ys, xs) } else { (xs, ys) };
    let sample_x = downsample(xs, sampling.offset, sampling.stride);
    let sample_y = downsample(ys, sampling.offset, sampling.stride);
    if sample_x.iter().chain(&sample_y).any(|value| !value.is_finite()) {
        return Err(FigureError::InvalidData(
            "fit samples must be finite".to_owned(),
        ));
    }
    Ok((sample_x, sample_y))
}

fn sort_by_abscissa(xs: &mut Vec<f64>, ys: &mut Vec<f64>) {
    let mut pairs: Vec<(f64, f64)> = xs.iter().copied().zip(ys.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    (*xs, *ys) = pairs.into_iter().unzip();
}

fn dense_grid(sample_x: &[f64], points: usize) -> FigureResult<Vec<f64>> {
    let (min, max) = finite_min_max(sample_x)
        .ok_or_else(|| FigureError::InvalidData("no samples left after down-sampling".to_owned()))?;
    Ok(linspace(min, max, points))
}

fn ensure_point_count(points: usize) -> FigureResult<()> {
    if points < 2 {
        return Err(FigureError::InvalidArgument(format!(
            "curve needs at least two evaluation points, got {points}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn default_sampling_skips_first_sample() {
        let (xs, ys) = prepare_samples(&[0.0, 1.0, 2.0, 3.0], &[5.0, 6.0, 7.0, 8.0], FitSampling::default(), false)
            .expect("samples");
        assert_eq!(xs, vec![1.0, 2.0, 3.0]);
        assert_eq!(ys, vec![6.0, 7.0, 8.0]);
    }

    #[test]
    fn swapped_spline_is_drawn_back_in_caller_orientation() {
        let ys: Vec<f64> = (0_u32..8).map(f64::from).collect();
        let xs: Vec<f64> = ys.iter().map(|y| y * y).collect();
        let options = SplineOptions {
            swap_axes: true,
            points: 5,
            sampling: FitSampling::ALL,
            ..SplineOptions::default()
        };
        let curve = fit_spline_curve(&xs, &ys, &options).expect("spline");
        let points = curve.plot_points();
        assert_eq!(points.len(), 5);
        assert_abs_diff_eq!(points[0].y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[4].y, 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(points[4].x, 49.0, epsilon = 1e-9);
    }

    #[test]
    fn duplicate_abscissae_are_rejected() {
        let options = SplineOptions {
            sampling: FitSampling::ALL,
            ..SplineOptions::default()
        };
        let err = fit_spline_curve(&[0.0, 1.0, 1.0, 2.0], &[0.0, 1.0, 2.0, 3.0], &options)
            .expect_err("duplicate");
        assert!(matches!(err, FigureError::InvalidData(_)));
    }

    #[test]
    fn eval_at_overrides_dense_grid() {
        let options = PolyfitOptions {
            degree: 1,
            sampling: FitSampling::ALL,
            eval_at: Some(vec![10.0]),
            ..PolyfitOptions::default()
        };
        let curve = fit_polynomial_curve(&[0.0, 1.0, 2.0], &[1.0, 3.0, 5.0], &options).expect("fit");
        assert_eq!(curve.xs, vec![10.0]);
        assert_abs_diff_eq!(curve.ys[0], 21.0, epsilon = 1e-9);
    }
}
