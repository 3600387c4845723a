mod curve_fit;
mod export;
mod figure;
mod labeled_grid;
mod number_format;
mod palette;
mod style;
mod surface;
mod view;
mod view_frame_builder;
mod zoom_link;

pub use curve_fit::{
    FitSampling, FittedCurve, PolyfitOptions, SplineOptions, fit_polynomial_curve,
    fit_spline_curve, polyfit_overlay, spline_overlay,
};
pub use export::{
    FigureFileSystem, ImageFormat, SaveOptions, StdFileSystem, save_figure, save_figure_with,
};
pub use figure::{Connector, Figure, POINTS_PER_INCH, SubplotParams};
pub use labeled_grid::{
    AXIS_LABEL_DEFAULTS, AxisLabelConfig, AxisLabelDefaults, ColorbarHandle,
    ContourOverlayConfig, GridAxis, LabeledGridHandle, LabeledGridOptions, ResolvedAxisConfig,
    ResolvedScaleConfig, SCALE_DEFAULTS, ScaleConfig, ScaleDefaults, render_labeled_grid,
    resolve_axis_config, resolve_scale_config,
};
pub use number_format::NumberFormat;
pub use palette::{
    CSL_2_1, CSL_4_1, CSL_4_2, DEFAULT_PALETTE_SAMPLES, custom_colormap, custom_dark_red_white,
    palette_colors, palette_preview, sample_colormap,
};
pub use style::{StyleContext, StyleOverrides, TickDirection};
pub use surface::{SurfaceHandle, SurfaceOptions, render_surface};
pub use view::{
    AxisTick, ColorbarSpec, DataLine, DataPolygon, DataText, GridLines, GridSpan, GridSpec,
    HeatmapLayer, MarkerSeries, View, ViewId, ViewPlacement,
};
pub use view_frame_builder::ViewLayout;
pub use zoom_link::{LinkEdge, ZoomLinkConfig, draw_zoom_frame_and_links, zone_and_link};
