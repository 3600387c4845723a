pub mod clip;
pub mod contour;
pub mod fit;
pub mod grid;
pub mod projection;
pub mod scale;
pub mod types;
pub mod zoom_window;

pub use clip::{PixelRect, clip_segment, clip_segment_outside};
pub use contour::{ContourLine, contour_levels, trace_contours};
pub use fit::{Polynomial, Spline, SplineOrder, downsample, linspace};
pub use grid::{GridMask, ValueGrid};
pub use projection::{BoxPoint, OrthoCamera, normalize_to_box};
pub use scale::{LinearScale, NiceTicks, decimals_for_step, nice_ticks};
pub use types::{DataBounds, DataPoint, Viewport, finite_min_max};
pub use zoom_window::{ZoomWindow, compute_zoom_window};
