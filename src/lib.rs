//! sci-figure: helpers for publication-style scientific figures.
//!
//! A [`Figure`] owns views laid out on subplot grids or as insets. The
//! helpers in [`api`] fill views with labeled heatmaps, zoom windows linked
//! to an inset, projected surfaces and fitted curves; the figure is then
//! turned into a [`render::RenderFrame`] and handed to any [`render::Renderer`]
//! or written to disk with [`api::save_figure`].

pub mod api;
pub mod core;
pub mod error;
pub mod render;
pub mod telemetry;

pub use api::{Figure, StyleContext, View, ViewId};
pub use error::{FigureError, FigureResult};
