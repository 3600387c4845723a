use approx::assert_relative_eq;
use sci_figure::api::{
    FitSampling, Figure, PolyfitOptions, SplineOptions, StyleContext, fit_polynomial_curve,
    fit_spline_curve, polyfit_overlay, spline_overlay,
};
use sci_figure::core::{Polynomial, Spline, SplineOrder};
use sci_figure::error::FigureError;
use sci_figure::render::Color;

#[test]
fn degree_one_fit_reproduces_line_and_samples() {
    let xs: Vec<f64> = (0..10).map(|i| i as f64 * 0.5).collect();
    let ys: Vec<f64> = xs.iter().map(|x| 2.0 * x + 1.0).collect();
    let options = PolyfitOptions {
        degree: 1,
        ..PolyfitOptions::default()
    };

    let curve = fit_polynomial_curve(&xs, &ys, &options).expect("fit");

    let coefficients = curve.model.coefficients();
    assert_relative_eq!(coefficients[0], 1.0, epsilon = 1e-9);
    assert_relative_eq!(coefficients[1], 2.0, epsilon = 1e-9);
    for (&x, &y) in xs.iter().zip(&ys) {
        assert_relative_eq!(curve.model.evaluate(x), y, epsilon = 1e-9);
    }
    // first sample is skipped by default
    assert_relative_eq!(curve.xs[0], 0.5);
    assert_relative_eq!(*curve.xs.last().expect("last"), 4.5);
    assert_eq!(curve.xs.len(), 1000);
}

#[test]
fn natural_cubic_spline_interpolates_knots() {
    let xs = [0.0, 1.0, 2.5, 3.0, 4.5];
    let ys = [1.0, -1.0, 0.5, 2.0, 0.0];
    let spline = Spline::fit(&xs, &ys, SplineOrder::Cubic).expect("spline");
    for (&x, &y) in xs.iter().zip(&ys) {
        assert_relative_eq!(spline.evaluate(x), y, epsilon = 1e-9);
    }
}

#[test]
fn spline_curve_sorts_unordered_samples() {
    let xs = [3.0, 0.0, 2.0, 1.0];
    let ys = [9.0, 0.0, 4.0, 1.0];
    let options = SplineOptions {
        sampling: FitSampling::ALL,
        order: SplineOrder::Linear,
        points: 7,
        ..SplineOptions::default()
    };

    let curve = fit_spline_curve(&xs, &ys, &options).expect("spline");

    assert_eq!(curve.xs, vec![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0]);
    assert_relative_eq!(curve.ys[1], 0.5);
    assert_relative_eq!(curve.ys[5], 6.5);
}

#[test]
fn overlays_draw_into_the_current_view() {
    let mut figure = Figure::new(6.0, 4.0, StyleContext::default()).expect("figure");
    let xs: Vec<f64> = (0_u32..12).map(f64::from).collect();
    let ys: Vec<f64> = xs.iter().map(|x| x.sin()).collect();

    let spline = spline_overlay(
        &mut figure,
        None,
        &xs,
        &ys,
        &SplineOptions {
            label: "spline".to_owned(),
            ..SplineOptions::default()
        },
    )
    .expect("spline overlay");
    let poly = polyfit_overlay(
        &mut figure,
        None,
        &xs,
        &ys,
        &PolyfitOptions {
            color: Color::BLACK,
            ..PolyfitOptions::default()
        },
    )
    .expect("polyfit overlay");

    let view = figure.current_view();
    let lines = figure.view(view).expect("view").lines();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].label, "spline");
    assert_eq!(lines[0].color, Color::GRAY);
    assert_eq!(lines[0].points.len(), spline.xs.len());
    assert_eq!(lines[1].color, Color::BLACK);
    assert_eq!(poly.model.degree(), 3);
}

#[test]
fn swapped_polyfit_is_drawn_back() {
    let mut figure = Figure::new(6.0, 4.0, StyleContext::default()).expect("figure");
    let ys: Vec<f64> = (0_u32..6).map(f64::from).collect();
    let xs: Vec<f64> = ys.iter().map(|y| 3.0 * y - 2.0).collect();
    let options = PolyfitOptions {
        degree: 1,
        swap_axes: true,
        eval_at: Some(vec![1.0]),
        ..PolyfitOptions::default()
    };

    let curve = polyfit_overlay(&mut figure, None, &xs, &ys, &options).expect("fit");

    // fitted as x = 3y - 2, evaluated at y = 1
    assert_relative_eq!(curve.ys[0], 1.0, epsilon = 1e-9);
    let view = figure.current_view();
    let point = figure.view(view).expect("view").lines()[0].points[0];
    assert_relative_eq!(point.x, 1.0, epsilon = 1e-9);
    assert_relative_eq!(point.y, 1.0, epsilon = 1e-9);
}

#[test]
fn fit_errors_are_classified() {
    let mismatched = fit_polynomial_curve(&[0.0, 1.0], &[0.0], &PolyfitOptions::default());
    assert!(matches!(mismatched, Err(FigureError::InvalidArgument(_))));

    let too_few = fit_polynomial_curve(&[0.0, 1.0, 2.0], &[0.0, 1.0, 2.0], &PolyfitOptions::default());
    assert!(matches!(too_few, Err(FigureError::InvalidData(_))));

    let non_finite = fit_spline_curve(
        &[0.0, 1.0, f64::NAN, 3.0],
        &[0.0, 1.0, 2.0, 3.0],
        &SplineOptions::default(),
    );
    assert!(matches!(non_finite, Err(FigureError::InvalidData(_))));
}

#[test]
fn polynomial_evaluates_lowest_power_first() {
    let polynomial = Polynomial::from_coefficients(vec![1.0, 0.0, 2.0]);
    assert_relative_eq!(polynomial.evaluate(3.0), 19.0);
}
