use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::api::style::StyleContext;
use crate::api::view::{GridSpan, GridSpec, View, ViewId, ViewPlacement};
use crate::core::{DataPoint, Viewport};
use crate::error::{FigureError, FigureResult};
use crate::render::{Color, Renderer};

/// Points per inch of the layout space every `RenderFrame` is built in.
pub const POINTS_PER_INCH: f64 = 72.0;

/// Margins and gaps of the subplot grid, as fractions of the figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubplotParams {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
    /// Horizontal gap between columns, as a fraction of the mean column width.
    pub wspace: f64,
    /// Vertical gap between rows, as a fraction of the mean row height.
    pub hspace: f64,
}

impl Default for SubplotParams {
    fn default() -> Self {
        Self {
            left: 0.125,
            right: 0.9,
            bottom: 0.11,
            top: 0.88,
            wspace: 0.2,
            hspace: 0.2,
        }
    }
}

impl SubplotParams {
    pub fn validate(self) -> FigureResult<()> {
        let fractions = [self.left, self.right, self.bottom, self.top];
        if fractions
            .iter()
            .any(|value| !value.is_finite() || !(0.0..=1.0).contains(value))
        {
            return Err(FigureError::InvalidArgument(
                "subplot margins must be fractions in [0, 1]".to_owned(),
            ));
        }
        if self.left >= self.right || self.bottom >= self.top {
            return Err(FigureError::InvalidArgument(
                "subplot margins must satisfy left < right and bottom < top".to_owned(),
            ));
        }
        if !self.wspace.is_finite() || !self.hspace.is_finite() || self.wspace < 0.0 || self.hspace < 0.0
        {
            return Err(FigureError::InvalidArgument(
                "subplot spacing must be finite and >= 0".to_owned(),
            ));
        }
        Ok(())
    }
}

/// Straight segment between a point in one view and a point in another,
/// drawn above every view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connector {
    pub from_view: ViewId,
    pub from: DataPoint,
    pub to_view: ViewId,
    pub to: DataPoint,
    pub color: Color,
    pub stroke_width: f64,
}

/// Caller-owned figure: a canvas of fixed physical size holding views,
/// figure-level connectors and the styling context.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    pub(crate) width_in: f64,
    pub(crate) height_in: f64,
    pub(crate) style: StyleContext,
    pub(crate) subplot_params: SubplotParams,
    pub(crate) background: Color,
    pub(crate) views: Vec<View>,
    pub(crate) connectors: Vec<Connector>,
    current: Option<ViewId>,
    next_view_id: u32,
}

impl Figure {
    pub fn new(width_in: f64, height_in: f64, style: StyleContext) -> FigureResult<Self> {
        if !width_in.is_finite() || !height_in.is_finite() || width_in <= 0.0 || height_in <= 0.0 {
            return Err(FigureError::InvalidFigureSize {
                width: width_in,
                height: height_in,
            });
        }
        style.validate()?;

        Ok(Self {
            width_in,
            height_in,
            style,
            subplot_params: SubplotParams::default(),
            background: Color::WHITE,
            views: Vec::new(),
            connectors: Vec::new(),
            current: None,
            next_view_id: 1,
        })
    }

    /// Figure with a `rows x columns` grid of equally sized views, returned row-major.
    pub fn subplots(
        rows: usize,
        columns: usize,
        size_in: (f64, f64),
        style: StyleContext,
    ) -> FigureResult<(Self, Vec<ViewId>)> {
        let mut figure = Self::new(size_in.0, size_in.1, style)?;
        let spec = GridSpec::new(rows, columns)?;
        let mut views = Vec::with_capacity(rows * columns);
        for row in 0..rows {
            for column in 0..columns {
                views.push(figure.add_grid_view(spec, GridSpan::cell(row, column))?);
            }
        }
        debug!(rows, columns, "created subplot grid");
        Ok((figure, views))
    }

    #[must_use]
    pub fn size_inches(&self) -> (f64, f64) {
        (self.width_in, self.height_in)
    }

    /// Layout canvas in points.
    #[must_use]
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            self.width_in * POINTS_PER_INCH,
            self.height_in * POINTS_PER_INCH,
        )
    }

    #[must_use]
    pub fn style(&self) -> &StyleContext {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut StyleContext {
        &mut self.style
    }

    #[must_use]
    pub fn subplot_params(&self) -> SubplotParams {
        self.subplot_params
    }

    pub fn set_subplot_params(&mut self, params: SubplotParams) -> FigureResult<()> {
        params.validate()?;
        self.subplot_params = params;
        Ok(())
    }

    pub fn set_background(&mut self, background: Color) -> FigureResult<()> {
        background.validate()?;
        self.background = background;
        Ok(())
    }

    /// Adds a view spanning `span` of `spec` and makes it current.
    pub fn add_grid_view(&mut self, spec: GridSpec, span: GridSpan) -> FigureResult<ViewId> {
        spec.ensure_span(span)?;
        let id = self.push_view(ViewPlacement::Grid { spec, span });
        self.current = Some(id);
        Ok(id)
    }

    /// Adds a view inside `parent`'s plot area; `bounds` is `[x0, y0, w, h]`
    /// in parent fractions from its bottom-left corner.
    pub fn inset_view(&mut self, parent: ViewId, bounds: [f64; 4]) -> FigureResult<ViewId> {
        self.view(parent)?;
        let [x0, y0, width, height] = bounds;
        if bounds.iter().any(|value| !value.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(FigureError::InvalidArgument(format!(
                "inset bounds must be finite with positive size, got {bounds:?}"
            )));
        }
        trace!(parent = parent.raw(), x0, y0, width, height, "add inset view");
        Ok(self.push_view(ViewPlacement::Inset { parent, bounds }))
    }

    /// Current view, creating a single full-grid view when there is none.
    pub fn current_view(&mut self) -> ViewId {
        if let Some(current) = self.current {
            return current;
        }
        let id = self.push_view(ViewPlacement::Grid {
            spec: SINGLE_CELL,
            span: GridSpan::cell(0, 0),
        });
        self.current = Some(id);
        id
    }

    pub fn set_current_view(&mut self, id: ViewId) -> FigureResult<()> {
        self.view(id)?;
        self.current = Some(id);
        Ok(())
    }

    pub fn view(&self, id: ViewId) -> FigureResult<&View> {
        self.views
            .iter()
            .find(|view| view.id() == id)
            .ok_or(FigureError::UnknownView(id))
    }

    pub fn view_mut(&mut self, id: ViewId) -> FigureResult<&mut View> {
        self.views
            .iter_mut()
            .find(|view| view.id() == id)
            .ok_or(FigureError::UnknownView(id))
    }

    #[must_use]
    pub fn views(&self) -> &[View] {
        &self.views
    }

    pub fn add_connector(&mut self, connector: Connector) -> FigureResult<()> {
        self.view(connector.from_view)?;
        self.view(connector.to_view)?;
        if !connector.from.is_finite() || !connector.to.is_finite() {
            return Err(FigureError::InvalidData(
                "connector end points must be finite".to_owned(),
            ));
        }
        if !connector.stroke_width.is_finite() || connector.stroke_width <= 0.0 {
            return Err(FigureError::InvalidArgument(
                "connector stroke width must be finite and > 0".to_owned(),
            ));
        }
        connector.color.validate()?;
        self.connectors.push(connector);
        Ok(())
    }

    #[must_use]
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Builds the frame and hands it to `renderer`.
    pub fn render<R: Renderer>(&self, renderer: &mut R) -> FigureResult<()> {
        let frame = self.build_render_frame()?;
        debug!(
            views = self.views.len(),
            rects = frame.rects.len(),
            polygons = frame.polygons.len(),
            lines = frame.lines.len(),
            texts = frame.texts.len(),
            "render figure"
        );
        renderer.render(&frame)
    }

    fn push_view(&mut self, placement: ViewPlacement) -> ViewId {
        let id = ViewId::new(self.next_view_id);
        self.next_view_id += 1;
        self.views.push(View::new(id, placement));
        id
    }
}

const SINGLE_CELL: GridSpec = GridSpec::single();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_size() {
        let err = Figure::new(0.0, 3.0, StyleContext::default()).expect_err("zero width");
        assert!(matches!(err, FigureError::InvalidFigureSize { .. }));
    }

    #[test]
    fn subplots_are_row_major_and_last_is_current() {
        let (mut figure, views) =
            Figure::subplots(2, 3, (6.0, 4.0), StyleContext::default()).expect("subplots");
        assert_eq!(views.len(), 6);
        assert_eq!(figure.current_view(), views[5]);
        match figure.view(views[4]).expect("view").placement() {
            ViewPlacement::Grid { span, .. } => assert_eq!(span, GridSpan::cell(1, 1)),
            other => panic!("unexpected placement {other:?}"),
        }
    }

    #[test]
    fn current_view_is_created_once() {
        let mut figure = Figure::new(4.0, 3.0, StyleContext::default()).expect("figure");
        let first = figure.current_view();
        assert_eq!(figure.current_view(), first);
        assert_eq!(figure.views().len(), 1);
    }

    #[test]
    fn inset_requires_known_parent() {
        let mut figure = Figure::new(4.0, 3.0, StyleContext::default()).expect("figure");
        let err = figure
            .inset_view(ViewId::new(42), [0.1, 0.1, 0.3, 0.3])
            .expect_err("unknown parent");
        assert!(matches!(err, FigureError::UnknownView(id) if id == ViewId::new(42)));
    }
}
