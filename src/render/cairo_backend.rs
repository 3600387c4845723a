use cairo::{Context, Format, ImageSurface};
use pango::FontDescription;

use crate::error::{FigureError, FigureResult};
use crate::render::{Color, LineStrokeStyle, RenderFrame, Renderer, TextHAlign, TextVAlign};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CairoRenderStats {
    pub lines_drawn: usize,
    pub rects_drawn: usize,
    pub polygons_drawn: usize,
    pub texts_drawn: usize,
}

/// Optional extension trait for renderers that can draw into an external Cairo
/// context (for example a GTK `DrawingArea` callback).
pub trait CairoContextRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> FigureResult<()>;
}

/// Cairo + Pango + PangoCairo raster renderer.
///
/// Frames are laid out in points; `dpi` scales them onto the pixel surface,
/// which is recreated on every render to match the frame size.
#[derive(Debug)]
pub struct CairoRenderer {
    dpi: f64,
    surface: Option<ImageSurface>,
    last_stats: CairoRenderStats,
}

impl CairoRenderer {
    pub fn new(dpi: u32) -> FigureResult<Self> {
        if dpi == 0 {
            return Err(FigureError::InvalidArgument(
                "cairo renderer dpi must be > 0".to_owned(),
            ));
        }
        Ok(Self {
            dpi: f64::from(dpi),
            surface: None,
            last_stats: CairoRenderStats::default(),
        })
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        "cairo+pango+pangocairo"
    }

    #[must_use]
    pub fn surface(&self) -> Option<&ImageSurface> {
        self.surface.as_ref()
    }

    #[must_use]
    pub fn last_stats(&self) -> CairoRenderStats {
        self.last_stats
    }

    /// Encodes the last rendered surface as PNG bytes.
    pub fn encode_png(&self) -> FigureResult<Vec<u8>> {
        let surface = self
            .surface
            .as_ref()
            .ok_or_else(|| FigureError::Backend("nothing has been rendered yet".to_owned()))?;
        let mut bytes = Vec::new();
        surface
            .write_to_png(&mut bytes)
            .map_err(|err| FigureError::Backend(format!("failed to encode png: {err}")))?;
        Ok(bytes)
    }

    fn render_with_context(&mut self, context: &Context, frame: &RenderFrame) -> FigureResult<()> {
        frame.validate()?;

        apply_color(context, frame.background);
        context
            .paint()
            .map_err(|err| map_backend_error("failed to clear surface", err))?;

        let mut stats = CairoRenderStats::default();

        for rect in &frame.rects {
            context.rectangle(rect.x, rect.y, rect.width, rect.height);
            apply_color(context, rect.fill_color);
            context
                .fill_preserve()
                .map_err(|err| map_backend_error("failed to fill rectangle", err))?;
            if rect.border_width > 0.0 {
                apply_color(context, rect.border_color);
                context.set_line_width(rect.border_width);
                context
                    .stroke()
                    .map_err(|err| map_backend_error("failed to stroke rectangle border", err))?;
            } else {
                context.new_path();
            }
            stats.rects_drawn += 1;
        }

        for polygon in &frame.polygons {
            let mut points = polygon.points.iter();
            if let Some(&(x, y)) = points.next() {
                context.move_to(x, y);
            }
            for &(x, y) in points {
                context.line_to(x, y);
            }
            context.close_path();
            apply_color(context, polygon.fill_color);
            context
                .fill_preserve()
                .map_err(|err| map_backend_error("failed to fill polygon", err))?;
            if polygon.border_width > 0.0 {
                apply_color(context, polygon.border_color);
                context.set_line_width(polygon.border_width);
                context
                    .stroke()
                    .map_err(|err| map_backend_error("failed to stroke polygon", err))?;
            } else {
                context.new_path();
            }
            stats.polygons_drawn += 1;
        }

        for line in &frame.lines {
            apply_color(context, line.color);
            context.set_line_width(line.stroke_width);
            apply_dash(context, line.stroke_style, line.stroke_width);
            context.move_to(line.x1, line.y1);
            context.line_to(line.x2, line.y2);
            context
                .stroke()
                .map_err(|err| map_backend_error("failed to stroke line", err))?;
            stats.lines_drawn += 1;
        }
        context.set_dash(&[], 0.0);

        for text in &frame.texts {
            let layout = pangocairo::functions::create_layout(context);
            let font_description = FontDescription::from_string(&format!(
                "{} {}",
                text.font_family, text.font_size_px
            ));
            layout.set_font_description(Some(&font_description));
            layout.set_text(&text.text);

            let (text_width, text_height) = layout.pixel_size();
            let dx = match text.h_align {
                TextHAlign::Left => 0.0,
                TextHAlign::Center => -f64::from(text_width) / 2.0,
                TextHAlign::Right => -f64::from(text_width),
            };
            let dy = match text.v_align {
                TextVAlign::Top => 0.0,
                TextVAlign::Middle => -f64::from(text_height) / 2.0,
                TextVAlign::Bottom => -f64::from(text_height),
            };

            context
                .save()
                .map_err(|err| map_backend_error("failed to save context", err))?;
            context.translate(text.x, text.y);
            context.rotate(-text.rotation_deg.to_radians());
            apply_color(context, text.color);
            context.move_to(dx, dy);
            pangocairo::functions::show_layout(context, &layout);
            context
                .restore()
                .map_err(|err| map_backend_error("failed to restore context", err))?;
            stats.texts_drawn += 1;
        }

        self.last_stats = stats;
        Ok(())
    }
}

impl Renderer for CairoRenderer {
    fn render(&mut self, frame: &RenderFrame) -> FigureResult<()> {
        let scale = self.dpi / 72.0;
        let width = (frame.viewport.width * scale).ceil() as i32;
        let height = (frame.viewport.height * scale).ceil() as i32;
        if width <= 0 || height <= 0 {
            return Err(FigureError::InvalidFigureSize {
                width: frame.viewport.width,
                height: frame.viewport.height,
            });
        }

        let surface = ImageSurface::create(Format::ARgb32, width, height)
            .map_err(|err| map_backend_error("failed to create cairo surface", err))?;
        let context = Context::new(&surface)
            .map_err(|err| map_backend_error("failed to create cairo context", err))?;
        context.scale(scale, scale);
        self.render_with_context(&context, frame)?;
        drop(context);
        self.surface = Some(surface);
        Ok(())
    }
}

impl CairoContextRenderer for CairoRenderer {
    fn render_on_cairo_context(
        &mut self,
        context: &Context,
        frame: &RenderFrame,
    ) -> FigureResult<()> {
        self.render_with_context(context, frame)
    }
}

fn apply_color(context: &Context, color: Color) {
    context.set_source_rgba(color.red, color.green, color.blue, color.alpha);
}

fn apply_dash(context: &Context, style: LineStrokeStyle, stroke_width: f64) {
    let dashes: Vec<f64> = style
        .dash_pattern()
        .iter()
        .map(|dash| dash * stroke_width)
        .collect();
    context.set_dash(&dashes, 0.0);
}

fn map_backend_error(prefix: &str, err: cairo::Error) -> FigureError {
    FigureError::Backend(format!("{prefix}: {err}"))
}
