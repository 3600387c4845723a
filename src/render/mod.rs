mod colormap;
mod frame;
mod null_renderer;
mod primitives;
mod svg_renderer;

pub use colormap::{COLORMAP_NAMES, Colormap, ColormapKind, normalize};
pub use frame::RenderFrame;
pub use null_renderer::NullRenderer;
pub use primitives::{
    Color, LinePrimitive, LineStrokeStyle, PolygonPrimitive, RectPrimitive, TextHAlign,
    TextPrimitive, TextVAlign,
};
pub use svg_renderer::SvgRenderer;

use crate::error::FigureResult;

/// Contract implemented by any rendering backend.
///
/// Backends receive a fully materialized, deterministic `RenderFrame` so
/// drawing code stays isolated from figure layout and helper logic.
pub trait Renderer {
    fn render(&mut self, frame: &RenderFrame) -> FigureResult<()>;
}

#[cfg(feature = "cairo-backend")]
mod cairo_backend;
#[cfg(feature = "cairo-backend")]
pub use cairo_backend::{CairoContextRenderer, CairoRenderStats, CairoRenderer};
