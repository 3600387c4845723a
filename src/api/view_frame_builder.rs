use tracing::trace;

use crate::api::figure::{Connector, Figure};
use crate::api::number_format::NumberFormat;
use crate::api::style::{StyleContext, TickDirection};
use crate::api::view::{AxisTick, ColorbarSpec, GridSpan, GridSpec, View, ViewId, ViewPlacement};
use crate::core::{
    DataPoint, LinearScale, PixelRect, clip_segment, clip_segment_outside, decimals_for_step,
    nice_ticks,
};
use crate::error::{FigureError, FigureResult};
use crate::render::{
    Color, LinePrimitive, LineStrokeStyle, PolygonPrimitive, RectPrimitive, RenderFrame,
    TextHAlign, TextPrimitive, TextVAlign, normalize,
};

const AUTO_TICK_TARGET: usize = 6;
const TICK_LABEL_PAD: f64 = 3.5;
const AXIS_TITLE_PAD: f64 = 4.0;
const TITLE_PAD: f64 = 6.0;
const COLORBAR_PAD_FRACTION: f64 = 0.05;
const COLORBAR_FRACTION: f64 = 0.15;
const COLORBAR_ASPECT: f64 = 20.0;
const COLORBAR_STRIPS: usize = 64;

/// Resolved placement and data mapping of one view, in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewLayout {
    pub id: ViewId,
    /// Slot assigned to the view before a colour bar takes its share.
    pub axes: PixelRect,
    /// Area data is drawn and clipped in.
    pub plot: PixelRect,
    pub colorbar: Option<PixelRect>,
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub y_inverted: bool,
}

impl ViewLayout {
    /// Pixel position of a data point.
    #[must_use]
    pub fn to_pixel(&self, point: DataPoint) -> (f64, f64) {
        let x = self
            .x_scale
            .domain_to_pixel(point.x, self.plot.left, self.plot.right());
        let y = if self.y_inverted {
            self.y_scale
                .domain_to_pixel(point.y, self.plot.top, self.plot.bottom())
        } else {
            self.y_scale
                .domain_to_pixel(point.y, self.plot.bottom(), self.plot.top)
        };
        (x, y)
    }
}

impl Figure {
    /// Layout of one view.
    pub fn view_layout(&self, id: ViewId) -> FigureResult<ViewLayout> {
        self.layout_views()?
            .into_iter()
            .find(|layout| layout.id == id)
            .ok_or(FigureError::UnknownView(id))
    }

    /// Materializes backend-agnostic primitives for the whole figure.
    ///
    /// Views are emitted in creation order; lines of a view are cut where a
    /// later view's background covers them so insets stay readable.
    pub fn build_render_frame(&self) -> FigureResult<RenderFrame> {
        let mut frame = RenderFrame::new(self.viewport());
        frame.background = self.background;

        let layouts = self.layout_views()?;
        for (index, (view, layout)) in self.views.iter().zip(&layouts).enumerate() {
            let occluders: Vec<PixelRect> = self.views[index + 1..]
                .iter()
                .zip(&layouts[index + 1..])
                .filter(|(later, _)| later.is_axis_visible())
                .filter_map(|(_, later)| later.axes.intersect(layout.plot))
                .collect();
            let mut painter = ViewPainter {
                frame: &mut frame,
                view,
                layout,
                style: &self.style,
                occluders: &occluders,
            };
            painter.paint()?;
            trace!(view = view.id().raw(), occluders = occluders.len(), "painted view");
        }

        for connector in &self.connectors {
            push_connector(&mut frame, &layouts, connector)?;
        }

        Ok(frame)
    }

    fn layout_views(&self) -> FigureResult<Vec<ViewLayout>> {
        let viewport = self.viewport();
        let canvas = PixelRect::new(0.0, 0.0, viewport.width, viewport.height);
        let mut layouts: Vec<ViewLayout> = Vec::with_capacity(self.views.len());

        for view in &self.views {
            let axes = match view.placement() {
                ViewPlacement::Grid { spec, span } => self.grid_slot(canvas, spec, span),
                ViewPlacement::Inset { parent, bounds } => layouts
                    .iter()
                    .find(|layout| layout.id == parent)
                    .map(|layout| layout.plot.fraction(bounds))
                    .ok_or(FigureError::UnknownView(parent))?,
            };
            layouts.push(layout_view(view, axes)?);
        }
        Ok(layouts)
    }

    fn grid_slot(&self, canvas: PixelRect, spec: GridSpec, span: GridSpan) -> PixelRect {
        let params = self.subplot_params;
        let area_left = canvas.left + params.left * canvas.width;
        let area_top = canvas.top + (1.0 - params.top) * canvas.height;
        let area_width = (params.right - params.left) * canvas.width;
        let area_height = (params.top - params.bottom) * canvas.height;

        let columns = spec.columns() as f64;
        let rows = spec.rows() as f64;
        let cell_width = area_width / (columns + params.wspace * (columns - 1.0));
        let cell_height = area_height / (rows + params.hspace * (rows - 1.0));
        let column_step = cell_width * (1.0 + params.wspace);
        let row_step = cell_height * (1.0 + params.hspace);

        let left = area_left + span.column_start as f64 * column_step;
        let right = area_left + (span.column_end - 1) as f64 * column_step + cell_width;
        let top = area_top + span.row_start as f64 * row_step;
        let bottom = area_top + (span.row_end - 1) as f64 * row_step + cell_height;
        PixelRect::new(left, top, right - left, bottom - top)
    }
}

fn layout_view(view: &View, axes: PixelRect) -> FigureResult<ViewLayout> {
    let (plot, colorbar) = match view.colorbar() {
        Some(spec) => {
            let plot_width = axes.width * (1.0 - COLORBAR_FRACTION - COLORBAR_PAD_FRACTION);
            let bar_height = axes.height * spec.shrink;
            let bar_width = (bar_height / COLORBAR_ASPECT).min(axes.width * COLORBAR_FRACTION);
            let bar = PixelRect::new(
                axes.left + plot_width + axes.width * COLORBAR_PAD_FRACTION,
                axes.top + (axes.height - bar_height) * 0.5,
                bar_width,
                bar_height,
            );
            (
                PixelRect::new(axes.left, axes.top, plot_width, axes.height),
                Some(bar),
            )
        }
        None => (axes, None),
    };

    let ((mut x0, mut x1), (mut y0, mut y1)) = view.resolved_limits();
    if view.has_equal_aspect() && plot.width > 0.0 && plot.height > 0.0 {
        let x_units = (x1 - x0).abs() / plot.width;
        let y_units = (y1 - y0).abs() / plot.height;
        if x_units > y_units {
            (y0, y1) = widened(y0, y1, x_units * plot.height);
        } else {
            (x0, x1) = widened(x0, x1, y_units * plot.width);
        }
    }

    Ok(ViewLayout {
        id: view.id(),
        axes,
        plot,
        colorbar,
        x_scale: LinearScale::new(x0, x1)?,
        y_scale: LinearScale::new(y0, y1)?,
        y_inverted: view.is_y_inverted(),
    })
}

/// `(a, b)` widened around its centre to `span`, keeping its orientation.
fn widened(a: f64, b: f64, span: f64) -> (f64, f64) {
    let centre = (a + b) * 0.5;
    let half = span * 0.5;
    if a <= b {
        (centre - half, centre + half)
    } else {
        (centre + half, centre - half)
    }
}

fn push_connector(
    frame: &mut RenderFrame,
    layouts: &[ViewLayout],
    connector: &Connector,
) -> FigureResult<()> {
    let find = |id: ViewId| {
        layouts
            .iter()
            .find(|layout| layout.id == id)
            .ok_or(FigureError::UnknownView(id))
    };
    let (x1, y1) = find(connector.from_view)?.to_pixel(connector.from);
    let (x2, y2) = find(connector.to_view)?.to_pixel(connector.to);
    frame.lines.push(LinePrimitive::new(
        x1,
        y1,
        x2,
        y2,
        connector.stroke_width,
        connector.color,
    ));
    Ok(())
}

/// Emits the primitives of one view into a shared frame.
struct ViewPainter<'a> {
    frame: &'a mut RenderFrame,
    view: &'a View,
    layout: &'a ViewLayout,
    style: &'a StyleContext,
    occluders: &'a [PixelRect],
}

impl ViewPainter<'_> {
    fn paint(&mut self) -> FigureResult<()> {
        let plot = self.layout.plot;
        if self.view.is_axis_visible() {
            self.frame
                .rects
                .push(RectPrimitive::new(plot.left, plot.top, plot.width, plot.height, Color::WHITE));
        }

        self.paint_heatmap();
        self.paint_polygons();

        let x_ticks = self.resolve_ticks(self.view.x_ticks(), self.layout.x_scale);
        let y_ticks = self.resolve_ticks(self.view.y_ticks(), self.layout.y_scale);
        if let Some(grid) = self.view.grid_lines() {
            self.paint_grid_lines(&x_ticks, &y_ticks, grid.color, grid.stroke_style);
        }

        self.paint_lines();
        self.paint_markers();

        if self.view.is_axis_visible() {
            self.paint_spines();
            self.paint_axes(&x_ticks, &y_ticks);
        }
        self.paint_texts();

        let view = self.view;
        if let (Some(spec), Some(bar)) = (view.colorbar(), self.layout.colorbar) {
            self.paint_colorbar(spec, bar);
        }
        Ok(())
    }

    fn font_family(&self) -> String {
        self.style.resolved_font_family().to_owned()
    }

    fn tick_direction(&self, fallback: TickDirection) -> TickDirection {
        self.view.tick_direction().unwrap_or(fallback)
    }

    fn resolve_ticks(&self, explicit: Option<&[AxisTick]>, scale: LinearScale) -> Vec<AxisTick> {
        let ticks = match explicit {
            Some(ticks) => ticks.to_vec(),
            None => {
                let (start, end) = scale.domain();
                let nice = nice_ticks(start, end, AUTO_TICK_TARGET);
                let format = NumberFormat::fixed(decimals_for_step(nice.step));
                nice.positions
                    .into_iter()
                    .map(|position| {
                        AxisTick::new(position, format.format(position, self.style.unicode_minus))
                    })
                    .collect()
            }
        };
        ticks
            .into_iter()
            .filter(|tick| tick.position.is_finite() && scale.contains(tick.position))
            .collect()
    }

    fn push_line(
        &mut self,
        start: (f64, f64),
        end: (f64, f64),
        stroke_width: f64,
        color: Color,
        stroke_style: LineStrokeStyle,
    ) {
        let Some((start, end)) = clip_segment(self.layout.plot, start, end) else {
            return;
        };
        let mut pieces = vec![(start, end)];
        for occluder in self.occluders {
            pieces = pieces
                .into_iter()
                .flat_map(|(a, b)| clip_segment_outside(*occluder, a, b))
                .collect();
        }
        for ((x1, y1), (x2, y2)) in pieces {
            self.frame.lines.push(
                LinePrimitive::new(x1, y1, x2, y2, stroke_width, color)
                    .with_stroke_style(stroke_style),
            );
        }
    }

    fn paint_heatmap(&mut self) {
        let Some(heatmap) = self.view.heatmap() else {
            return;
        };
        let plot = self.layout.plot;
        for row in 0..heatmap.grid.rows() {
            for column in 0..heatmap.grid.columns() {
                let hidden = heatmap
                    .mask
                    .as_ref()
                    .is_some_and(|mask| mask.is_hidden(row, column));
                let Some(value) = heatmap.grid.get(row, column) else {
                    continue;
                };
                if hidden || !value.is_finite() {
                    continue;
                }

                let (xa, ya) = self
                    .layout
                    .to_pixel(DataPoint::new(column as f64, row as f64));
                let (xb, yb) = self
                    .layout
                    .to_pixel(DataPoint::new(column as f64 + 1.0, row as f64 + 1.0));
                let cell = PixelRect::new(xa.min(xb), ya.min(yb), (xb - xa).abs(), (yb - ya).abs());
                if let Some(cell) = cell.intersect(plot) {
                    let fill = heatmap
                        .colormap
                        .map(value, heatmap.value_min, heatmap.value_max);
                    self.frame
                        .rects
                        .push(RectPrimitive::new(cell.left, cell.top, cell.width, cell.height, fill));
                }
            }
        }
    }

    fn paint_polygons(&mut self) {
        for polygon in self.view.polygons() {
            let points = polygon
                .points
                .iter()
                .map(|point| self.layout.to_pixel(*point))
                .collect();
            self.frame.polygons.push(
                PolygonPrimitive::new(points, polygon.fill_color)
                    .with_border(polygon.border_width, polygon.border_color),
            );
        }
    }

    fn paint_grid_lines(
        &mut self,
        x_ticks: &[AxisTick],
        y_ticks: &[AxisTick],
        color: Color,
        stroke_style: LineStrokeStyle,
    ) {
        let plot = self.layout.plot;
        let width = self.style.axes_line_width;
        for tick in x_ticks {
            let (x, _) = self.layout.to_pixel(DataPoint::new(tick.position, 0.0));
            self.push_line((x, plot.top), (x, plot.bottom()), width, color, stroke_style);
        }
        for tick in y_ticks {
            let (_, y) = self.layout.to_pixel(DataPoint::new(0.0, tick.position));
            self.push_line((plot.left, y), (plot.right(), y), width, color, stroke_style);
        }
    }

    fn paint_lines(&mut self) {
        let view = self.view;
        for line in view.lines() {
            let pixels: Vec<(f64, f64)> = line
                .points
                .iter()
                .filter(|point| point.is_finite())
                .map(|point| self.layout.to_pixel(*point))
                .collect();
            for pair in pixels.windows(2) {
                self.push_line(
                    pair[0],
                    pair[1],
                    line.stroke_width,
                    line.color,
                    line.stroke_style,
                );
            }
        }
    }

    fn paint_markers(&mut self) {
        let plot = self.layout.plot;
        for series in self.view.markers() {
            let half = series.size * 0.5;
            for point in series.points.iter().filter(|point| point.is_finite()) {
                let (x, y) = self.layout.to_pixel(*point);
                if x < plot.left || x > plot.right() || y < plot.top || y > plot.bottom() {
                    continue;
                }
                let rect = if series.filled {
                    RectPrimitive::new(x - half, y - half, series.size, series.size, series.color)
                } else {
                    RectPrimitive::new(x - half, y - half, series.size, series.size, Color::TRANSPARENT)
                        .with_border(1.0, series.color)
                };
                self.frame.rects.push(rect);
            }
        }
    }

    fn paint_spines(&mut self) {
        let plot = self.layout.plot;
        let width = self.style.axes_line_width;
        let corners = [
            (plot.left, plot.top),
            (plot.right(), plot.top),
            (plot.right(), plot.bottom()),
            (plot.left, plot.bottom()),
        ];
        for index in 0..corners.len() {
            let (x1, y1) = corners[index];
            let (x2, y2) = corners[(index + 1) % corners.len()];
            self.frame
                .lines
                .push(LinePrimitive::new(x1, y1, x2, y2, width, Color::BLACK));
        }
    }

    fn paint_axes(&mut self, x_ticks: &[AxisTick], y_ticks: &[AxisTick]) {
        let plot = self.layout.plot;
        let style = self.style;
        let width = style.axes_line_width;
        let family = self.font_family();

        let (x_inside, x_outside) = self
            .tick_direction(style.xtick_direction)
            .extent(style.tick_length);
        let mut x_label_depth: f64 = 0.0;
        for tick in x_ticks {
            let (x, _) = self.layout.to_pixel(DataPoint::new(tick.position, 0.0));
            let bottom = plot.bottom();
            self.frame.lines.push(LinePrimitive::new(
                x,
                bottom + x_outside,
                x,
                bottom - x_inside,
                width,
                Color::BLACK,
            ));
            if tick.label.is_empty() {
                continue;
            }
            let text = TextPrimitive::new(
                tick.label.clone(),
                x,
                bottom + x_outside + TICK_LABEL_PAD,
                style.xtick_label_size,
                Color::BLACK,
                TextHAlign::Center,
            )
            .with_v_align(TextVAlign::Top)
            .with_rotation(tick.rotation_deg)
            .with_font_family(family.clone());
            x_label_depth = x_label_depth.max(rotated_extent(&text).1);
            self.frame.texts.push(text);
        }

        let (y_inside, y_outside) = self
            .tick_direction(style.ytick_direction)
            .extent(style.tick_length);
        let mut y_label_depth: f64 = 0.0;
        for tick in y_ticks {
            let (_, y) = self.layout.to_pixel(DataPoint::new(0.0, tick.position));
            self.frame.lines.push(LinePrimitive::new(
                plot.left - y_outside,
                y,
                plot.left + y_inside,
                y,
                width,
                Color::BLACK,
            ));
            if tick.label.is_empty() {
                continue;
            }
            let text = TextPrimitive::new(
                tick.label.clone(),
                plot.left - y_outside - TICK_LABEL_PAD,
                y,
                style.ytick_label_size,
                Color::BLACK,
                TextHAlign::Right,
            )
            .with_rotation(tick.rotation_deg)
            .with_font_family(family.clone());
            y_label_depth = y_label_depth.max(rotated_extent(&text).0);
            self.frame.texts.push(text);
        }

        if let Some(label) = self.view.x_label().filter(|label| !label.is_empty()) {
            self.frame.texts.push(
                TextPrimitive::new(
                    label,
                    plot.left + plot.width * 0.5,
                    plot.bottom() + x_outside + TICK_LABEL_PAD + x_label_depth + AXIS_TITLE_PAD,
                    style.font_size,
                    Color::BLACK,
                    TextHAlign::Center,
                )
                .with_v_align(TextVAlign::Top)
                .with_font_family(family.clone()),
            );
        }
        if let Some(label) = self.view.y_label().filter(|label| !label.is_empty()) {
            self.frame.texts.push(
                TextPrimitive::new(
                    label,
                    plot.left - y_outside - TICK_LABEL_PAD - y_label_depth - AXIS_TITLE_PAD,
                    plot.top + plot.height * 0.5,
                    style.font_size,
                    Color::BLACK,
                    TextHAlign::Center,
                )
                .with_v_align(TextVAlign::Bottom)
                .with_rotation(90.0)
                .with_font_family(family.clone()),
            );
        }
        if let Some(title) = self.view.title().filter(|title| !title.is_empty()) {
            self.frame.texts.push(
                TextPrimitive::new(
                    title,
                    plot.left + plot.width * 0.5,
                    plot.top - TITLE_PAD,
                    style.font_size * 1.2,
                    Color::BLACK,
                    TextHAlign::Center,
                )
                .with_v_align(TextVAlign::Bottom)
                .with_font_family(family),
            );
        }
    }

    fn paint_texts(&mut self) {
        let plot = self.layout.plot;
        let family = self.font_family();
        for text in self.view.texts() {
            if text.text.is_empty() {
                continue;
            }
            let (x, y) = self.layout.to_pixel(text.position);
            if x < plot.left || x > plot.right() || y < plot.top || y > plot.bottom() {
                continue;
            }
            self.frame.texts.push(
                TextPrimitive::new(
                    text.text.clone(),
                    x,
                    y,
                    text.font_size.unwrap_or(self.style.font_size),
                    text.color,
                    text.h_align,
                )
                .with_rotation(text.rotation_deg)
                .with_font_family(family.clone()),
            );
        }
    }

    fn paint_colorbar(&mut self, spec: &ColorbarSpec, bar: PixelRect) {
        let style = self.style;
        let strip_height = bar.height / COLORBAR_STRIPS as f64;
        for strip in 0..COLORBAR_STRIPS {
            let t = (strip as f64 + 0.5) / COLORBAR_STRIPS as f64;
            let top = bar.bottom() - (strip as f64 + 1.0) * strip_height;
            self.frame.rects.push(RectPrimitive::new(
                bar.left,
                top,
                bar.width,
                strip_height,
                spec.colormap.at(t),
            ));
        }
        self.frame.rects.push(
            RectPrimitive::new(bar.left, bar.top, bar.width, bar.height, Color::TRANSPARENT)
                .with_border(style.axes_line_width, Color::BLACK),
        );

        let family = self.font_family();
        let ticks = nice_ticks(spec.value_min, spec.value_max, spec.tick_count.max(2));
        let format = NumberFormat::fixed(decimals_for_step(ticks.step));
        let mut label_width: f64 = 0.0;
        for position in ticks.positions {
            let y = bar.bottom() - normalize(position, spec.value_min, spec.value_max) * bar.height;
            self.frame.lines.push(LinePrimitive::new(
                bar.right(),
                y,
                bar.right() + style.tick_length,
                y,
                style.axes_line_width,
                Color::BLACK,
            ));
            let text = TextPrimitive::new(
                format.format(position, style.unicode_minus),
                bar.right() + style.tick_length + TICK_LABEL_PAD,
                y,
                style.ytick_label_size,
                Color::BLACK,
                TextHAlign::Left,
            )
            .with_font_family(family.clone());
            label_width = label_width.max(text.approximate_extent().0);
            self.frame.texts.push(text);
        }

        if !spec.label.is_empty() {
            self.frame.texts.push(
                TextPrimitive::new(
                    spec.label.clone(),
                    bar.right() + style.tick_length + TICK_LABEL_PAD + label_width + AXIS_TITLE_PAD,
                    bar.top + bar.height * 0.5,
                    style.font_size,
                    Color::BLACK,
                    TextHAlign::Center,
                )
                .with_v_align(TextVAlign::Top)
                .with_rotation(90.0)
                .with_font_family(family),
            );
        }
    }
}

/// Width and height of a text's box after rotation.
fn rotated_extent(text: &TextPrimitive) -> (f64, f64) {
    let (width, height) = text.approximate_extent();
    let (sin, cos) = text.rotation_deg.to_radians().sin_cos();
    (
        (width * cos).abs() + (height * sin).abs(),
        (width * sin).abs() + (height * cos).abs(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::style::StyleContext;
    use crate::api::view::DataLine;

    #[test]
    fn single_view_fills_default_margins() {
        let mut figure = Figure::new(10.0, 5.0, StyleContext::default()).expect("figure");
        let view = figure.current_view();
        let layout = figure.view_layout(view).expect("layout");
        assert!((layout.plot.left - 0.125 * 720.0).abs() < 1e-9);
        assert!((layout.plot.right() - 0.9 * 720.0).abs() < 1e-9);
        assert!((layout.plot.top - 0.12 * 360.0).abs() < 1e-9);
        assert!((layout.plot.bottom() - 0.89 * 360.0).abs() < 1e-9);
    }

    #[test]
    fn inset_lines_do_not_show_through() {
        let mut figure = Figure::new(4.0, 4.0, StyleContext::default()).expect("figure");
        let primary = figure.current_view();
        figure
            .view_mut(primary)
            .expect("primary")
            .add_line(DataLine::from_xy(&[0.0, 1.0], &[0.5, 0.5], Color::BLACK))
            .expect("line");
        figure
            .view_mut(primary)
            .expect("primary")
            .set_x_limits(0.0, 1.0)
            .expect("limits");
        let inset = figure
            .inset_view(primary, [0.25, 0.25, 0.5, 0.5])
            .expect("inset");
        let inset_rect = figure.view_layout(inset).expect("layout").axes;

        let frame = figure.build_render_frame().expect("frame");
        let through = frame.lines.iter().any(|line| {
            let mid_x = (line.x1 + line.x2) * 0.5;
            let mid_y = (line.y1 + line.y2) * 0.5;
            line.stroke_width == 1.5
                && mid_x > inset_rect.left
                && mid_x < inset_rect.right()
                && mid_y > inset_rect.top
                && mid_y < inset_rect.bottom()
        });
        assert!(!through);
    }
}
