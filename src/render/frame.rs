use crate::core::Viewport;
use crate::error::{FigureError, FigureResult};
use crate::render::{
    Color, LinePrimitive, PolygonPrimitive, RectPrimitive, TextHAlign, TextPrimitive, TextVAlign,
};

/// Backend-agnostic scene for one figure draw pass, in points.
///
/// Primitives are painted in field order: rects, polygons, lines, texts.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub viewport: Viewport,
    pub background: Color,
    pub rects: Vec<RectPrimitive>,
    pub polygons: Vec<PolygonPrimitive>,
    pub lines: Vec<LinePrimitive>,
    pub texts: Vec<TextPrimitive>,
}

impl RenderFrame {
    #[must_use]
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            background: Color::WHITE,
            rects: Vec::new(),
            polygons: Vec::new(),
            lines: Vec::new(),
            texts: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_line(mut self, line: LinePrimitive) -> Self {
        self.lines.push(line);
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: TextPrimitive) -> Self {
        self.texts.push(text);
        self
    }

    #[must_use]
    pub fn with_rect(mut self, rect: RectPrimitive) -> Self {
        self.rects.push(rect);
        self
    }

    pub fn validate(&self) -> FigureResult<()> {
        if !self.viewport.is_valid() {
            return Err(FigureError::InvalidFigureSize {
                width: self.viewport.width,
                height: self.viewport.height,
            });
        }

        self.background.validate()?;
        for rect in &self.rects {
            rect.validate()?;
        }
        for polygon in &self.polygons {
            polygon.validate()?;
        }
        for line in &self.lines {
            line.validate()?;
        }
        for text in &self.texts {
            text.validate()?;
        }

        Ok(())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
            && self.rects.is_empty()
            && self.polygons.is_empty()
            && self.texts.is_empty()
    }

    /// Bounding box `(left, top, right, bottom)` of everything drawn, with
    /// text extents estimated from font size and character count.
    #[must_use]
    pub fn content_bounds(&self) -> Option<(f64, f64, f64, f64)> {
        let mut bounds: Option<(f64, f64, f64, f64)> = None;
        let mut include = |x: f64, y: f64| {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x), b.max(y)),
            });
        };

        for rect in &self.rects {
            let pad = rect.border_width * 0.5;
            include(rect.x - pad, rect.y - pad);
            include(rect.x + rect.width + pad, rect.y + rect.height + pad);
        }
        for polygon in &self.polygons {
            for &(x, y) in &polygon.points {
                include(x, y);
            }
        }
        for line in &self.lines {
            let pad = line.stroke_width * 0.5;
            include(line.x1.min(line.x2) - pad, line.y1.min(line.y2) - pad);
            include(line.x1.max(line.x2) + pad, line.y1.max(line.y2) + pad);
        }
        for text in &self.texts {
            for (x, y) in text_corners(text) {
                include(x, y);
            }
        }

        bounds
    }

    /// Frame cropped to its content plus `pad` points on every side.
    ///
    /// An empty frame is returned unchanged.
    #[must_use]
    pub fn cropped_to_content(&self, pad: f64) -> Self {
        let Some((left, top, right, bottom)) = self.content_bounds() else {
            return self.clone();
        };
        let dx = pad - left;
        let dy = pad - top;

        let mut cropped = self.clone();
        cropped.viewport = Viewport::new(right - left + 2.0 * pad, bottom - top + 2.0 * pad);
        for rect in &mut cropped.rects {
            rect.x += dx;
            rect.y += dy;
        }
        for polygon in &mut cropped.polygons {
            for point in &mut polygon.points {
                point.0 += dx;
                point.1 += dy;
            }
        }
        for line in &mut cropped.lines {
            line.x1 += dx;
            line.x2 += dx;
            line.y1 += dy;
            line.y2 += dy;
        }
        for text in &mut cropped.texts {
            text.x += dx;
            text.y += dy;
        }
        cropped
    }
}

/// Corners of a text box after alignment and rotation.
fn text_corners(text: &TextPrimitive) -> [(f64, f64); 4] {
    let (width, height) = text.approximate_extent();
    let left = match text.h_align {
        TextHAlign::Left => 0.0,
        TextHAlign::Center => -width * 0.5,
        TextHAlign::Right => -width,
    };
    let top = match text.v_align {
        TextVAlign::Top => 0.0,
        TextVAlign::Middle => -height * 0.5,
        TextVAlign::Bottom => -height,
    };

    // Pixel space grows downward, so a counter-clockwise rotation uses -angle.
    let (sin, cos) = (-text.rotation_deg.to_radians()).sin_cos();
    let rotate = |dx: f64, dy: f64| (text.x + dx * cos - dy * sin, text.y + dx * sin + dy * cos);
    [
        rotate(left, top),
        rotate(left + width, top),
        rotate(left + width, top + height),
        rotate(left, top + height),
    ]
}
