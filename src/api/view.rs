use serde::{Deserialize, Serialize};

use crate::api::style::TickDirection;
use crate::core::{DataBounds, DataPoint, GridMask, ValueGrid};
use crate::error::{FigureError, FigureResult};
use crate::render::{Color, Colormap, LineStrokeStyle, TextHAlign};

/// Stable identifier of one view (axes) inside a `Figure`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ViewId(u32);

impl ViewId {
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Cell range of a [`GridSpec`], end-exclusive on both axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpan {
    pub row_start: usize,
    pub row_end: usize,
    pub column_start: usize,
    pub column_end: usize,
}

impl GridSpan {
    #[must_use]
    pub const fn cell(row: usize, column: usize) -> Self {
        Self {
            row_start: row,
            row_end: row + 1,
            column_start: column,
            column_end: column + 1,
        }
    }

    #[must_use]
    pub const fn new(rows: std::ops::Range<usize>, columns: std::ops::Range<usize>) -> Self {
        Self {
            row_start: rows.start,
            row_end: rows.end,
            column_start: columns.start,
            column_end: columns.end,
        }
    }
}

/// Regular grid of subplot slots laid out between the figure's subplot margins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSpec {
    rows: usize,
    columns: usize,
}

impl GridSpec {
    pub fn new(rows: usize, columns: usize) -> FigureResult<Self> {
        if rows == 0 || columns == 0 {
            return Err(FigureError::InvalidArgument(format!(
                "grid spec needs at least one row and column, got {rows}x{columns}"
            )));
        }
        Ok(Self { rows, columns })
    }

    pub(crate) const fn single() -> Self {
        Self {
            rows: 1,
            columns: 1,
        }
    }

    #[must_use]
    pub fn rows(self) -> usize {
        self.rows
    }

    #[must_use]
    pub fn columns(self) -> usize {
        self.columns
    }

    pub(crate) fn ensure_span(self, span: GridSpan) -> FigureResult<()> {
        if span.row_start >= span.row_end
            || span.column_start >= span.column_end
            || span.row_end > self.rows
            || span.column_end > self.columns
        {
            return Err(FigureError::InvalidArgument(format!(
                "span rows {}..{} columns {}..{} does not fit a {}x{} grid",
                span.row_start, span.row_end, span.column_start, span.column_end, self.rows,
                self.columns
            )));
        }
        Ok(())
    }
}

/// Where a view sits on the figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewPlacement {
    /// Slot of a grid laid out between the figure's subplot margins.
    Grid { spec: GridSpec, span: GridSpan },
    /// `[x0, y0, width, height]` in fractions of the parent's plot area,
    /// measured from its bottom-left corner.
    Inset { parent: ViewId, bounds: [f64; 4] },
}

/// One tick with its label; an empty label draws only the mark.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisTick {
    pub position: f64,
    pub label: String,
    pub rotation_deg: f64,
}

impl AxisTick {
    #[must_use]
    pub fn new(position: f64, label: impl Into<String>) -> Self {
        Self {
            position,
            label: label.into(),
            rotation_deg: 0.0,
        }
    }

    #[must_use]
    pub fn with_rotation(mut self, rotation_deg: f64) -> Self {
        self.rotation_deg = rotation_deg;
        self
    }
}

/// Polyline in data space.
#[derive(Debug, Clone, PartialEq)]
pub struct DataLine {
    pub points: Vec<DataPoint>,
    pub color: Color,
    pub stroke_width: f64,
    pub stroke_style: LineStrokeStyle,
    pub label: Option<String>,
}

impl DataLine {
    #[must_use]
    pub fn new(points: Vec<DataPoint>, color: Color) -> Self {
        Self {
            points,
            color,
            stroke_width: 1.5,
            stroke_style: LineStrokeStyle::Solid,
            label: None,
        }
    }

    #[must_use]
    pub fn from_xy(xs: &[f64], ys: &[f64], color: Color) -> Self {
        let points = xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| DataPoint::new(x, y))
            .collect();
        Self::new(points, color)
    }

    #[must_use]
    pub fn with_stroke_width(mut self, stroke_width: f64) -> Self {
        self.stroke_width = stroke_width;
        self
    }

    #[must_use]
    pub fn with_stroke_style(mut self, stroke_style: LineStrokeStyle) -> Self {
        self.stroke_style = stroke_style;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        let label = label.into();
        self.label = (!label.is_empty()).then_some(label);
        self
    }
}

/// Filled polygon in data space; not clipped to the plot area.
#[derive(Debug, Clone, PartialEq)]
pub struct DataPolygon {
    pub points: Vec<DataPoint>,
    pub fill_color: Color,
    pub border_width: f64,
    pub border_color: Color,
}

impl DataPolygon {
    #[must_use]
    pub fn new(points: Vec<DataPoint>, fill_color: Color) -> Self {
        Self {
            points,
            fill_color,
            border_width: 0.0,
            border_color: Color::TRANSPARENT,
        }
    }

    #[must_use]
    pub fn with_border(mut self, border_width: f64, border_color: Color) -> Self {
        self.border_width = border_width;
        self.border_color = border_color;
        self
    }
}

/// Square markers centred on data points.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSeries {
    pub points: Vec<DataPoint>,
    pub color: Color,
    /// Edge length in points.
    pub size: f64,
    pub filled: bool,
}

/// Text anchored at a data position.
#[derive(Debug, Clone, PartialEq)]
pub struct DataText {
    pub position: DataPoint,
    pub text: String,
    pub color: Color,
    /// Falls back to the style's base font size when `None`.
    pub font_size: Option<f64>,
    pub h_align: TextHAlign,
    pub rotation_deg: f64,
}

impl DataText {
    #[must_use]
    pub fn new(position: DataPoint, text: impl Into<String>, color: Color) -> Self {
        Self {
            position,
            text: text.into(),
            color,
            font_size: None,
            h_align: TextHAlign::Center,
            rotation_deg: 0.0,
        }
    }

    #[must_use]
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = Some(font_size);
        self
    }
}

/// Colour-mapped cells; column `j` spans `x in [j, j + 1]`, row `i` spans `y in [i, i + 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapLayer {
    pub grid: ValueGrid,
    pub mask: Option<GridMask>,
    pub colormap: Colormap,
    pub value_min: f64,
    pub value_max: f64,
}

/// Colour bar drawn to the right of a view's plot area.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorbarSpec {
    pub colormap: Colormap,
    pub value_min: f64,
    pub value_max: f64,
    pub label: String,
    pub tick_count: usize,
    /// Fraction of the view height the bar occupies, centred vertically.
    pub shrink: f64,
}

/// Background grid lines at the tick positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLines {
    pub stroke_style: LineStrokeStyle,
    pub color: Color,
}

/// One axes region of a figure and everything drawn inside it.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    id: ViewId,
    placement: ViewPlacement,
    x_limits: Option<(f64, f64)>,
    y_limits: Option<(f64, f64)>,
    x_ticks: Option<Vec<AxisTick>>,
    y_ticks: Option<Vec<AxisTick>>,
    x_label: Option<String>,
    y_label: Option<String>,
    title: Option<String>,
    tick_direction: Option<TickDirection>,
    y_inverted: bool,
    axis_visible: bool,
    equal_aspect: bool,
    grid_lines: Option<GridLines>,
    lines: Vec<DataLine>,
    polygons: Vec<DataPolygon>,
    markers: Vec<MarkerSeries>,
    texts: Vec<DataText>,
    heatmap: Option<HeatmapLayer>,
    colorbar: Option<ColorbarSpec>,
}

impl View {
    pub(crate) fn new(id: ViewId, placement: ViewPlacement) -> Self {
        Self {
            id,
            placement,
            x_limits: None,
            y_limits: None,
            x_ticks: None,
            y_ticks: None,
            x_label: None,
            y_label: None,
            title: None,
            tick_direction: None,
            y_inverted: false,
            axis_visible: true,
            equal_aspect: false,
            grid_lines: None,
            lines: Vec::new(),
            polygons: Vec::new(),
            markers: Vec::new(),
            texts: Vec::new(),
            heatmap: None,
            colorbar: None,
        }
    }

    #[must_use]
    pub fn id(&self) -> ViewId {
        self.id
    }

    #[must_use]
    pub fn placement(&self) -> ViewPlacement {
        self.placement
    }

    /// Fixes the x range; `left > right` is allowed and mirrors the axis.
    pub fn set_x_limits(&mut self, left: f64, right: f64) -> FigureResult<()> {
        self.x_limits = Some(checked_limits("x", left, right)?);
        Ok(())
    }

    /// Fixes the y range; `bottom > top` is allowed and mirrors the axis.
    pub fn set_y_limits(&mut self, bottom: f64, top: f64) -> FigureResult<()> {
        self.y_limits = Some(checked_limits("y", bottom, top)?);
        Ok(())
    }

    #[must_use]
    pub fn x_limits(&self) -> Option<(f64, f64)> {
        self.x_limits
    }

    #[must_use]
    pub fn y_limits(&self) -> Option<(f64, f64)> {
        self.y_limits
    }

    /// Explicit x ticks; an empty list hides them. `None` restores automatic ticks.
    pub fn set_x_ticks(&mut self, ticks: Option<Vec<AxisTick>>) {
        self.x_ticks = ticks;
    }

    pub fn set_y_ticks(&mut self, ticks: Option<Vec<AxisTick>>) {
        self.y_ticks = ticks;
    }

    #[must_use]
    pub fn x_ticks(&self) -> Option<&[AxisTick]> {
        self.x_ticks.as_deref()
    }

    #[must_use]
    pub fn y_ticks(&self) -> Option<&[AxisTick]> {
        self.y_ticks.as_deref()
    }

    pub fn set_x_label(&mut self, label: impl Into<String>) {
        self.x_label = Some(label.into());
    }

    pub fn set_y_label(&mut self, label: impl Into<String>) {
        self.y_label = Some(label.into());
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = Some(title.into());
    }

    #[must_use]
    pub fn x_label(&self) -> Option<&str> {
        self.x_label.as_deref()
    }

    #[must_use]
    pub fn y_label(&self) -> Option<&str> {
        self.y_label.as_deref()
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Overrides the figure style's tick direction for this view only.
    pub fn set_tick_direction(&mut self, direction: Option<TickDirection>) {
        self.tick_direction = direction;
    }

    #[must_use]
    pub fn tick_direction(&self) -> Option<TickDirection> {
        self.tick_direction
    }

    /// Puts the lower y limit at the top of the plot area (image orientation).
    pub fn set_y_inverted(&mut self, inverted: bool) {
        self.y_inverted = inverted;
    }

    #[must_use]
    pub fn is_y_inverted(&self) -> bool {
        self.y_inverted
    }

    /// Hides the background, spines, ticks and axis titles.
    pub fn set_axis_visible(&mut self, visible: bool) {
        self.axis_visible = visible;
    }

    #[must_use]
    pub fn is_axis_visible(&self) -> bool {
        self.axis_visible
    }

    /// Widens one of the limits so a data unit spans the same length on both axes.
    pub fn set_equal_aspect(&mut self, equal: bool) {
        self.equal_aspect = equal;
    }

    #[must_use]
    pub fn has_equal_aspect(&self) -> bool {
        self.equal_aspect
    }

    pub fn set_grid_lines(&mut self, grid_lines: Option<GridLines>) {
        self.grid_lines = grid_lines;
    }

    #[must_use]
    pub fn grid_lines(&self) -> Option<GridLines> {
        self.grid_lines
    }

    pub fn add_line(&mut self, line: DataLine) -> FigureResult<()> {
        if line.points.len() < 2 {
            return Err(FigureError::InvalidData(
                "a line needs at least two points".to_owned(),
            ));
        }
        ensure_width("line stroke width", line.stroke_width)?;
        line.color.validate()?;
        self.lines.push(line);
        Ok(())
    }

    pub fn add_polygon(&mut self, polygon: DataPolygon) -> FigureResult<()> {
        if polygon.points.len() < 3 {
            return Err(FigureError::InvalidData(
                "a polygon needs at least three points".to_owned(),
            ));
        }
        if polygon.points.iter().any(|point| !point.is_finite()) {
            return Err(FigureError::InvalidData(
                "polygon points must be finite".to_owned(),
            ));
        }
        polygon.fill_color.validate()?;
        self.polygons.push(polygon);
        Ok(())
    }

    pub fn add_markers(&mut self, markers: MarkerSeries) -> FigureResult<()> {
        ensure_width("marker size", markers.size)?;
        markers.color.validate()?;
        self.markers.push(markers);
        Ok(())
    }

    pub fn add_text(&mut self, text: DataText) -> FigureResult<()> {
        if !text.position.is_finite() {
            return Err(FigureError::InvalidData(
                "text position must be finite".to_owned(),
            ));
        }
        text.color.validate()?;
        self.texts.push(text);
        Ok(())
    }

    pub fn set_heatmap(&mut self, heatmap: HeatmapLayer) -> FigureResult<()> {
        if let Some(mask) = &heatmap.mask {
            mask.ensure_matches(&heatmap.grid)?;
        }
        self.heatmap = Some(heatmap);
        Ok(())
    }

    pub fn set_colorbar(&mut self, colorbar: ColorbarSpec) -> FigureResult<()> {
        if !colorbar.value_min.is_finite() || !colorbar.value_max.is_finite() {
            return Err(FigureError::InvalidData(
                "colour bar range must be finite".to_owned(),
            ));
        }
        if !(colorbar.shrink > 0.0 && colorbar.shrink <= 1.0) {
            return Err(FigureError::InvalidArgument(
                "colour bar shrink must be in (0, 1]".to_owned(),
            ));
        }
        self.colorbar = Some(colorbar);
        Ok(())
    }

    #[must_use]
    pub fn lines(&self) -> &[DataLine] {
        &self.lines
    }

    #[must_use]
    pub fn polygons(&self) -> &[DataPolygon] {
        &self.polygons
    }

    #[must_use]
    pub fn markers(&self) -> &[MarkerSeries] {
        &self.markers
    }

    #[must_use]
    pub fn texts(&self) -> &[DataText] {
        &self.texts
    }

    #[must_use]
    pub fn heatmap(&self) -> Option<&HeatmapLayer> {
        self.heatmap.as_ref()
    }

    #[must_use]
    pub fn colorbar(&self) -> Option<&ColorbarSpec> {
        self.colorbar.as_ref()
    }

    /// Limits used for drawing: explicit limits when set, otherwise the
    /// content bounds (heatmaps exactly, other content with 5% margins).
    #[must_use]
    pub fn resolved_limits(&self) -> ((f64, f64), (f64, f64)) {
        let auto = self.auto_limits();
        (
            self.x_limits.unwrap_or(auto.0),
            self.y_limits.unwrap_or(auto.1),
        )
    }

    fn auto_limits(&self) -> ((f64, f64), (f64, f64)) {
        let points = self
            .lines
            .iter()
            .flat_map(|line| &line.points)
            .chain(self.polygons.iter().flat_map(|polygon| &polygon.points))
            .chain(self.markers.iter().flat_map(|markers| &markers.points))
            .filter(|point| point.is_finite());
        let content = DataBounds::from_points(points);

        if let Some(heatmap) = &self.heatmap {
            let cells = DataBounds {
                x_min: 0.0,
                x_max: heatmap.grid.columns() as f64,
                y_min: 0.0,
                y_max: heatmap.grid.rows() as f64,
            };
            let bounds = content.map_or(cells, |content| content.union(cells));
            return ((bounds.x_min, bounds.x_max), (bounds.y_min, bounds.y_max));
        }

        match content {
            Some(bounds) => (
                padded(bounds.x_min, bounds.x_max),
                padded(bounds.y_min, bounds.y_max),
            ),
            None => ((0.0, 1.0), (0.0, 1.0)),
        }
    }
}

fn padded(min: f64, max: f64) -> (f64, f64) {
    let span = max - min;
    if span.abs() < f64::EPSILON {
        let pad = if min.abs() > f64::EPSILON { min.abs() * 0.05 } else { 0.5 };
        return (min - pad, max + pad);
    }
    (min - span * 0.05, max + span * 0.05)
}

fn checked_limits(axis: &str, a: f64, b: f64) -> FigureResult<(f64, f64)> {
    if !a.is_finite() || !b.is_finite() {
        return Err(FigureError::InvalidData(format!(
            "{axis} limits must be finite, got ({a}, {b})"
        )));
    }
    if a == b {
        return Err(FigureError::InvalidRange(format!(
            "{axis} limits must differ, got ({a}, {b})"
        )));
    }
    Ok((a, b))
}

fn ensure_width(what: &str, width: f64) -> FigureResult<()> {
    if !width.is_finite() || width <= 0.0 {
        return Err(FigureError::InvalidArgument(format!(
            "{what} must be finite and > 0"
        )));
    }
    Ok(())
}
