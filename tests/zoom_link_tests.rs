use proptest::prelude::*;
use sci_figure::api::{Figure, LinkEdge, StyleContext, ZoomLinkConfig, draw_zoom_frame_and_links, zone_and_link};
use sci_figure::core::{DataPoint, ZoomWindow, compute_zoom_window};
use sci_figure::error::FigureError;

fn primary_with_inset() -> (Figure, sci_figure::ViewId, sci_figure::ViewId) {
    let mut figure = Figure::new(6.0, 4.0, StyleContext::default()).expect("figure");
    let primary = figure.current_view();
    let inset = figure
        .inset_view(primary, [0.55, 0.55, 0.4, 0.4])
        .expect("inset");
    (figure, primary, inset)
}

fn sample_window() -> ZoomWindow {
    ZoomWindow {
        x_left: 2.0,
        x_right: 4.0,
        y_bottom: -1.0,
        y_top: 3.0,
    }
}

#[test]
fn zero_padding_yields_tight_bounding_box() {
    let coords = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
    let first = [5.0, 4.0, 3.0, 2.0, 1.0, 0.0];
    let second = [0.0, 9.0, -2.0, 7.0, 8.0, 1.0];

    let window = compute_zoom_window(&coords, &[first, second], 1, 4, 0.0, 0.0).expect("window");

    assert_eq!(
        window,
        ZoomWindow {
            x_left: 1.0,
            x_right: 4.0,
            y_bottom: -2.0,
            y_top: 9.0,
        }
    );
}

#[test]
fn empty_or_out_of_bounds_range_is_rejected() {
    let coords = [0.0, 1.0, 2.0];
    let series = [[1.0, 2.0, 3.0]];
    assert!(matches!(
        compute_zoom_window(&coords, &series, 2, 2, 0.05, 0.05),
        Err(FigureError::InvalidRange(_))
    ));
    assert!(matches!(
        compute_zoom_window(&coords, &series, 0, 3, 0.05, 0.05),
        Err(FigureError::InvalidRange(_))
    ));
}

#[test]
fn each_link_edge_draws_two_connectors_from_the_table() {
    let expected = [
        (LinkEdge::Bottom, [((2.0, 3.0), (2.0, -1.0)), ((4.0, 3.0), (4.0, -1.0))]),
        (LinkEdge::Top, [((2.0, -1.0), (2.0, 3.0)), ((4.0, -1.0), (4.0, 3.0))]),
        (LinkEdge::Left, [((4.0, 3.0), (2.0, 3.0)), ((4.0, -1.0), (2.0, -1.0))]),
        (LinkEdge::Right, [((2.0, 3.0), (4.0, 3.0)), ((2.0, -1.0), (4.0, -1.0))]),
    ];

    for (edge, pairs) in expected {
        let (mut figure, primary, inset) = primary_with_inset();
        draw_zoom_frame_and_links(&mut figure, primary, inset, sample_window(), edge)
            .expect("links");

        let connectors = figure.connectors();
        assert_eq!(connectors.len(), 2, "{edge}");
        for (connector, ((ix, iy), (px, py))) in connectors.iter().zip(pairs) {
            assert_eq!(connector.from_view, inset);
            assert_eq!(connector.to_view, primary);
            assert_eq!(connector.from, DataPoint::new(ix, iy), "{edge}");
            assert_eq!(connector.to, DataPoint::new(px, py), "{edge}");
        }
    }
}

#[test]
fn unknown_link_tag_fails_loudly() {
    let err = "middle".parse::<LinkEdge>().expect_err("unknown edge");
    assert!(matches!(err, FigureError::InvalidArgument(_)));
    assert!(err.to_string().contains("middle"));
}

#[test]
fn zone_and_link_zooms_inset_and_outlines_primary() {
    let (mut figure, primary, inset) = primary_with_inset();
    let coords: Vec<f64> = (0_u32..20).map(f64::from).collect();
    let series: Vec<f64> = coords.iter().map(|x| x * x).collect();

    let config = ZoomLinkConfig::new(5, 10).with_link_edge(LinkEdge::Top);
    let window = zone_and_link(&mut figure, primary, inset, &coords, &[series], &config)
        .expect("zone and link");

    let inset_view = figure.view(inset).expect("inset view");
    assert_eq!(inset_view.x_limits(), Some((window.x_left, window.x_right)));
    assert_eq!(inset_view.y_limits(), Some((window.y_bottom, window.y_top)));

    let outline = &figure.view(primary).expect("primary").lines()[0];
    assert_eq!(outline.points.len(), 5);
    assert_eq!(outline.points.first(), outline.points.last());
    assert_eq!(figure.connectors().len(), 2);
}

#[test]
fn descending_coordinates_give_an_inverted_window() {
    let coords = [4.0, 3.0, 2.0, 1.0, 0.0];
    let series = [1.0, 2.0, 3.0, 4.0, 5.0];

    let window = compute_zoom_window(&coords, &[series], 1, 3, 0.1, 0.0).expect("window");
    assert!(window.x_left > window.x_right);
    assert_eq!(window.y_bottom, 2.0);
    assert_eq!(window.y_top, 3.0);

    let (mut figure, primary, inset) = primary_with_inset();
    let config = ZoomLinkConfig::new(1, 3);
    let linked = zone_and_link(&mut figure, primary, inset, &coords, &[series], &config)
        .expect("zone and link");
    let (left, right) = figure
        .view(inset)
        .expect("inset view")
        .x_limits()
        .expect("inset x limits");
    assert!(left > right);
    assert_eq!((left, right), (linked.x_left, linked.x_right));
}

#[test]
fn linking_a_view_to_itself_is_rejected() {
    let (mut figure, primary, _) = primary_with_inset();
    let err = draw_zoom_frame_and_links(&mut figure, primary, primary, sample_window(), LinkEdge::Bottom)
        .expect_err("same view");
    assert!(matches!(err, FigureError::InvalidArgument(_)));
}

#[test]
fn linked_figure_renders_valid_frame() {
    let (mut figure, primary, inset) = primary_with_inset();
    draw_zoom_frame_and_links(&mut figure, primary, inset, sample_window(), LinkEdge::Left)
        .expect("links");
    let frame = figure.build_render_frame().expect("frame");
    frame.validate().expect("valid frame");
    assert!(!frame.lines.is_empty());
}

proptest! {
    #[test]
    fn zoom_window_contains_selected_sub_range(
        values in prop::collection::vec(-1_000.0f64..1_000.0, 4..40),
        start_factor in 0.0f64..1.0,
        span_factor in 0.0f64..1.0,
        x_ratio in 0.0f64..0.5,
        y_ratio in 0.0f64..0.5,
    ) {
        let len = values.len();
        let coords: Vec<f64> = (0..len).map(|i| i as f64 * 0.5).collect();
        let start = ((len - 2) as f64 * start_factor) as usize;
        let end = start + 1 + ((len - 2 - start) as f64 * span_factor) as usize;

        let window = compute_zoom_window(&coords, &[values.clone()], start, end, x_ratio, y_ratio)
            .expect("window");

        prop_assert!(window.x_left <= coords[start]);
        prop_assert!(window.x_right >= coords[end]);
        for &value in &values[start..end] {
            prop_assert!(window.y_bottom <= value);
            prop_assert!(window.y_top >= value);
        }
    }
}
