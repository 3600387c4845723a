use approx::assert_relative_eq;
use proptest::prelude::*;
use sci_figure::core::{
    PixelRect, Spline, SplineOrder, ValueGrid, clip_segment, contour_levels, nice_ticks,
    trace_contours,
};

#[test]
fn single_peak_yields_one_closed_ring() {
    let grid = ValueGrid::from_fn(7, 7, |row, column| {
        let dr = row as f64 - 3.0;
        let dc = column as f64 - 3.0;
        10.0 - dr * dr - dc * dc
    })
    .expect("grid");

    let lines = trace_contours(&grid, &[5.0]);

    assert_eq!(lines.len(), 1);
    let ring = &lines[0];
    assert!(ring.closed);
    assert_relative_eq!(ring.level, 5.0);
    for point in &ring.points {
        let radius = ((point.x - 3.0).powi(2) + (point.y - 3.0).powi(2)).sqrt();
        assert!(radius > 1.5 && radius < 3.0, "radius {radius}");
    }
}

#[test]
fn nan_cells_break_contours_without_panicking() {
    let grid = ValueGrid::from_rows(&[
        [0.0, 1.0, 2.0],
        [1.0, f64::NAN, 3.0],
        [2.0, 3.0, 4.0],
    ])
    .expect("grid");
    let lines = trace_contours(&grid, &[1.5, 2.5]);
    assert!(
        lines
            .iter()
            .all(|line| line.points.iter().all(|p| p.x.is_finite() && p.y.is_finite()))
    );
}

proptest! {
    #[test]
    fn contour_levels_lie_strictly_inside_range(
        min in -1_000.0f64..1_000.0,
        span in 0.001f64..1_000.0,
        count in 1usize..12,
    ) {
        let max = min + span;
        let levels = contour_levels(min, max, count);
        prop_assert!(levels.len() <= count);
        for pair in levels.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for level in levels {
            prop_assert!(level > min && level < max);
        }
    }

    #[test]
    fn nice_ticks_stay_inside_interval(
        min in -1e6f64..1e6,
        span in 1e-3f64..1e6,
        target in 2usize..10,
    ) {
        let ticks = nice_ticks(min, min + span, target);
        prop_assert!(ticks.step > 0.0);
        let slack = ticks.step * 1e-6 + min.abs() * 1e-12;
        for position in ticks.positions {
            prop_assert!(position >= min - slack);
            prop_assert!(position <= min + span + slack);
        }
    }

    #[test]
    fn clipped_segments_stay_in_rect(
        x1 in -200.0f64..400.0,
        y1 in -200.0f64..400.0,
        x2 in -200.0f64..400.0,
        y2 in -200.0f64..400.0,
    ) {
        let rect = PixelRect::new(10.0, 20.0, 150.0, 100.0);
        if let Some(((ax, ay), (bx, by))) = clip_segment(rect, (x1, y1), (x2, y2)) {
            for (x, y) in [(ax, ay), (bx, by)] {
                prop_assert!(x >= rect.left - 1e-9 && x <= rect.right() + 1e-9);
                prop_assert!(y >= rect.top - 1e-9 && y <= rect.bottom() + 1e-9);
            }
        }
    }

    #[test]
    fn linear_spline_passes_through_knots(
        ys in prop::collection::vec(-100.0f64..100.0, 2..20),
    ) {
        let xs: Vec<f64> = (0..ys.len()).map(|i| i as f64 * 1.5).collect();
        let spline = Spline::fit(&xs, &ys, SplineOrder::Linear).expect("spline");
        for (&x, &y) in xs.iter().zip(&ys) {
            prop_assert!((spline.evaluate(x) - y).abs() <= 1e-9);
        }
    }
}
