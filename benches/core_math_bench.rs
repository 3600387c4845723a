use criterion::{Criterion, criterion_group, criterion_main};
use sci_figure::api::{Figure, StyleContext, SurfaceOptions, render_surface};
use sci_figure::core::{Polynomial, ValueGrid, compute_zoom_window, contour_levels, trace_contours};
use sci_figure::render::NullRenderer;
use std::hint::black_box;

fn bench_zoom_window_10k(c: &mut Criterion) {
    let coords: Vec<f64> = (0_u32..10_000).map(|i| f64::from(i) * 0.01).collect();
    let series: Vec<Vec<f64>> = (0_u32..4)
        .map(|k| coords.iter().map(|x| (x * f64::from(k + 1)).sin()).collect())
        .collect();

    c.bench_function("zoom_window_10k", |b| {
        b.iter(|| {
            let _ = compute_zoom_window(
                black_box(&coords),
                black_box(&series),
                black_box(2_000),
                black_box(7_500),
                0.05,
                0.05,
            )
            .expect("zoom window");
        })
    });
}

fn bench_contours_200x200(c: &mut Criterion) {
    let grid = ValueGrid::from_fn(200, 200, |row, column| {
        let x = column as f64 / 20.0;
        let y = row as f64 / 20.0;
        x.sin() * y.cos()
    })
    .expect("grid");
    let levels = contour_levels(-1.0, 1.0, 8);

    c.bench_function("contours_200x200", |b| {
        b.iter(|| {
            let _ = trace_contours(black_box(&grid), black_box(&levels));
        })
    });
}

fn bench_polyfit_5k(c: &mut Criterion) {
    let xs: Vec<f64> = (0_u32..5_000).map(|i| f64::from(i) / 500.0).collect();
    let ys: Vec<f64> = xs.iter().map(|x| 0.5 * x * x * x - x + 3.0).collect();

    c.bench_function("polyfit_degree3_5k", |b| {
        b.iter(|| {
            let _ = Polynomial::fit(black_box(&xs), black_box(&ys), 3).expect("fit");
        })
    });
}

fn bench_surface_frame_60x60(c: &mut Criterion) {
    let rows: Vec<f64> = (0_u32..60).map(f64::from).collect();
    let columns = rows.clone();
    let grid = ValueGrid::from_fn(60, 60, |row, column| {
        ((row as f64) / 9.0).sin() + ((column as f64) / 7.0).cos()
    })
    .expect("grid");
    let mut figure = Figure::new(6.0, 5.0, StyleContext::default()).expect("figure");
    render_surface(&mut figure, None, &rows, &columns, &grid, &SurfaceOptions::default())
        .expect("surface");
    let mut renderer = NullRenderer::default();

    c.bench_function("surface_frame_60x60", |b| {
        b.iter(|| {
            figure.render(black_box(&mut renderer)).expect("render");
        })
    });
}

criterion_group!(
    benches,
    bench_zoom_window_10k,
    bench_contours_200x200,
    bench_polyfit_5k,
    bench_surface_frame_60x60
);
criterion_main!(benches);
