use std::fmt::{self, Write as FmtWrite};

use crate::error::{FigureError, FigureResult};
use crate::render::{
    Color, LineStrokeStyle, RenderFrame, Renderer, TextHAlign, TextPrimitive, TextVAlign,
};

/// Renderer that serializes a frame into a standalone SVG document.
///
/// Coordinates are written in points; the document declares its size in `pt`
/// so it prints at the figure's physical size.
#[derive(Debug, Default)]
pub struct SvgRenderer {
    document: String,
}

impl SvgRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Document produced by the last successful `render` call.
    #[must_use]
    pub fn document(&self) -> &str {
        &self.document
    }

    #[must_use]
    pub fn into_document(self) -> String {
        self.document
    }
}

impl Renderer for SvgRenderer {
    fn render(&mut self, frame: &RenderFrame) -> FigureResult<()> {
        frame.validate()?;
        let mut out = String::new();
        write_document(&mut out, frame)
            .map_err(|err| FigureError::Backend(format!("failed to write svg: {err}")))?;
        self.document = out;
        Ok(())
    }
}

fn write_document(out: &mut String, frame: &RenderFrame) -> fmt::Result {
    let width = frame.viewport.width;
    let height = frame.viewport.height;
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{width:.2}pt" height="{height:.2}pt" viewBox="0 0 {width:.2} {height:.2}">"#
    )?;
    writeln!(
        out,
        r#"<rect x="0" y="0" width="{width:.2}" height="{height:.2}" {}/>"#,
        fill_attr(frame.background)
    )?;

    for rect in &frame.rects {
        write!(
            out,
            r#"<rect x="{:.3}" y="{:.3}" width="{:.3}" height="{:.3}" {}"#,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            fill_attr(rect.fill_color)
        )?;
        if rect.border_width > 0.0 {
            write!(out, " {}", stroke_attr(rect.border_color, rect.border_width))?;
        }
        writeln!(out, "/>")?;
    }

    for polygon in &frame.polygons {
        out.push_str(r#"<polygon points=""#);
        for (index, (x, y)) in polygon.points.iter().enumerate() {
            if index > 0 {
                out.push(' ');
            }
            write!(out, "{x:.3},{y:.3}")?;
        }
        write!(out, r#"" {}"#, fill_attr(polygon.fill_color))?;
        if polygon.border_width > 0.0 {
            write!(
                out,
                " {}",
                stroke_attr(polygon.border_color, polygon.border_width)
            )?;
        }
        writeln!(out, "/>")?;
    }

    for line in &frame.lines {
        write!(
            out,
            r#"<line x1="{:.3}" y1="{:.3}" x2="{:.3}" y2="{:.3}" {}"#,
            line.x1,
            line.y1,
            line.x2,
            line.y2,
            stroke_attr(line.color, line.stroke_width)
        )?;
        if line.stroke_style != LineStrokeStyle::Solid {
            let dashes: Vec<String> = line
                .stroke_style
                .dash_pattern()
                .iter()
                .map(|dash| format!("{:.2}", dash * line.stroke_width))
                .collect();
            write!(out, r#" stroke-dasharray="{}""#, dashes.join(","))?;
        }
        writeln!(out, "/>")?;
    }

    for text in &frame.texts {
        write_text(out, text)?;
    }

    writeln!(out, "</svg>")
}

fn write_text(out: &mut String, text: &TextPrimitive) -> fmt::Result {
    let anchor = match text.h_align {
        TextHAlign::Left => "start",
        TextHAlign::Center => "middle",
        TextHAlign::Right => "end",
    };
    let baseline = match text.v_align {
        TextVAlign::Top => "hanging",
        TextVAlign::Middle => "central",
        TextVAlign::Bottom => "text-after-edge",
    };
    write!(
        out,
        r#"<text x="{:.3}" y="{:.3}" font-family="{}" font-size="{:.2}" text-anchor="{anchor}" dominant-baseline="{baseline}" {}"#,
        text.x,
        text.y,
        escape(&text.font_family),
        text.font_size_px,
        fill_attr(text.color)
    )?;
    if text.rotation_deg != 0.0 {
        write!(
            out,
            r#" transform="rotate({:.2} {:.3} {:.3})""#,
            -text.rotation_deg, text.x, text.y
        )?;
    }
    writeln!(out, ">{}</text>", escape(&text.text))
}

fn fill_attr(color: Color) -> String {
    if color.alpha <= 0.0 {
        return r#"fill="none""#.to_owned();
    }
    if color.alpha < 1.0 {
        return format!(r#"fill="{}" fill-opacity="{:.3}""#, color.to_hex(), color.alpha);
    }
    format!(r#"fill="{}""#, color.to_hex())
}

fn stroke_attr(color: Color, width: f64) -> String {
    if color.alpha < 1.0 {
        return format!(
            r#"stroke="{}" stroke-opacity="{:.3}" stroke-width="{width:.3}""#,
            color.to_hex(),
            color.alpha
        );
    }
    format!(r#"stroke="{}" stroke-width="{width:.3}""#, color.to_hex())
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}
