use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FigureError, FigureResult};

/// Side of the axis spine that tick marks are drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TickDirection {
    #[default]
    In,
    Out,
    InOut,
}

impl TickDirection {
    pub fn parse(spec: &str) -> FigureResult<Self> {
        match spec {
            "in" => Ok(Self::In),
            "out" => Ok(Self::Out),
            "inout" => Ok(Self::InOut),
            other => Err(FigureError::InvalidArgument(format!(
                "unknown tick direction `{other}`"
            ))),
        }
    }

    /// Extent `(inside, outside)` of a tick mark of `length` points.
    #[must_use]
    pub fn extent(self, length: f64) -> (f64, f64) {
        match self {
            Self::In => (length, 0.0),
            Self::Out => (0.0, length),
            Self::InOut => (length * 0.5, length * 0.5),
        }
    }
}

/// rcParam-style overrides applied with [`StyleContext::update`], in insertion order.
pub type StyleOverrides = IndexMap<String, Value>;

/// Explicit styling context carried by every `Figure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleContext {
    pub font_family: String,
    pub font_serif: Vec<String>,
    pub font_size: f64,
    pub xtick_label_size: f64,
    pub ytick_label_size: f64,
    pub xtick_direction: TickDirection,
    pub ytick_direction: TickDirection,
    pub unicode_minus: bool,
    pub mathtext_fontset: String,
    pub tick_length: f64,
    pub axes_line_width: f64,
}

impl Default for StyleContext {
    fn default() -> Self {
        Self {
            font_family: "serif".to_owned(),
            font_serif: vec!["SimSun".to_owned()],
            font_size: 12.0,
            xtick_label_size: 14.0,
            ytick_label_size: 14.0,
            xtick_direction: TickDirection::In,
            ytick_direction: TickDirection::In,
            unicode_minus: false,
            mathtext_fontset: "stix".to_owned(),
            tick_length: 3.5,
            axes_line_width: 0.8,
        }
    }
}

impl StyleContext {
    /// Loads a full context from JSON; missing keys keep their defaults.
    pub fn from_json_str(json: &str) -> FigureResult<Self> {
        let style: Self = serde_json::from_str(json)?;
        style.validate()?;
        Ok(style)
    }

    /// Sets both tick-label sizes to `axis_size` and the base font to `font_size`.
    pub fn update_font_size(&mut self, axis_size: f64, font_size: f64) -> FigureResult<()> {
        ensure_font_size("xtick.labelsize", axis_size)?;
        ensure_font_size("font.size", font_size)?;
        self.xtick_label_size = axis_size;
        self.ytick_label_size = axis_size;
        self.font_size = font_size;
        Ok(())
    }

    /// Merges rcParam-style keys into the context.
    ///
    /// The update is atomic: when any key is unknown or mistyped the context
    /// is left untouched.
    pub fn update(&mut self, overrides: &StyleOverrides) -> FigureResult<()> {
        let mut next = self.clone();
        for (key, value) in overrides {
            next.apply(key, value)?;
        }
        *self = next;
        Ok(())
    }

    /// Font family used for rendered text: the first serif font when the
    /// family is `serif`, otherwise the family itself.
    #[must_use]
    pub fn resolved_font_family(&self) -> &str {
        if self.font_family == "serif" {
            if let Some(first) = self.font_serif.first() {
                return first;
            }
        }
        &self.font_family
    }

    pub fn validate(&self) -> FigureResult<()> {
        ensure_font_size("font.size", self.font_size)?;
        ensure_font_size("xtick.labelsize", self.xtick_label_size)?;
        ensure_font_size("ytick.labelsize", self.ytick_label_size)?;
        if !self.tick_length.is_finite() || self.tick_length < 0.0 {
            return Err(FigureError::InvalidArgument(
                "tick length must be finite and >= 0".to_owned(),
            ));
        }
        if !self.axes_line_width.is_finite() || self.axes_line_width <= 0.0 {
            return Err(FigureError::InvalidArgument(
                "axes line width must be finite and > 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn apply(&mut self, key: &str, value: &Value) -> FigureResult<()> {
        match key {
            "font.size" => self.font_size = font_size_value(key, value)?,
            "font.family" => self.font_family = string_value(key, value)?,
            "font.serif" => self.font_serif = string_list_value(key, value)?,
            "xtick.labelsize" => self.xtick_label_size = font_size_value(key, value)?,
            "ytick.labelsize" => self.ytick_label_size = font_size_value(key, value)?,
            "xtick.direction" => {
                self.xtick_direction = TickDirection::parse(&string_value(key, value)?)?;
            }
            "ytick.direction" => {
                self.ytick_direction = TickDirection::parse(&string_value(key, value)?)?;
            }
            "axes.unicode_minus" => {
                self.unicode_minus = value.as_bool().ok_or_else(|| mistyped(key, "a bool"))?;
            }
            "mathtext.fontset" => self.mathtext_fontset = string_value(key, value)?,
            other => {
                return Err(FigureError::InvalidArgument(format!(
                    "unknown style key `{other}`"
                )));
            }
        }
        Ok(())
    }
}

fn ensure_font_size(key: &str, size: f64) -> FigureResult<()> {
    if !size.is_finite() || size <= 0.0 {
        return Err(FigureError::InvalidArgument(format!(
            "`{key}` must be finite and > 0, got {size}"
        )));
    }
    Ok(())
}

fn font_size_value(key: &str, value: &Value) -> FigureResult<f64> {
    let size = value.as_f64().ok_or_else(|| mistyped(key, "a number"))?;
    ensure_font_size(key, size)?;
    Ok(size)
}

fn string_value(key: &str, value: &Value) -> FigureResult<String> {
    value
        .as_str()
        .map(str::to_owned)
        .ok_or_else(|| mistyped(key, "a string"))
}

fn string_list_value(key: &str, value: &Value) -> FigureResult<Vec<String>> {
    match value {
        Value::String(single) => Ok(vec![single.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| string_value(key, item))
            .collect(),
        _ => Err(mistyped(key, "a string or list of strings")),
    }
}

fn mistyped(key: &str, expected: &str) -> FigureError {
    FigureError::InvalidArgument(format!("style key `{key}` expects {expected}"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults_match_house_style() {
        let style = StyleContext::default();
        assert_eq!(style.font_family, "serif");
        assert_eq!(style.font_serif, vec!["SimSun".to_owned()]);
        assert_eq!(style.font_size, 12.0);
        assert_eq!(style.xtick_label_size, 14.0);
        assert_eq!(style.ytick_direction, TickDirection::In);
        assert!(!style.unicode_minus);
        assert_eq!(style.resolved_font_family(), "SimSun");
    }

    #[test]
    fn failed_update_leaves_context_untouched() {
        let mut style = StyleContext::default();
        let mut overrides = StyleOverrides::new();
        overrides.insert("font.size".to_owned(), json!(20));
        overrides.insert("lines.linewidth".to_owned(), json!(2));
        assert!(style.update(&overrides).is_err());
        assert_eq!(style, StyleContext::default());
    }

    #[test]
    fn font_serif_accepts_single_string() {
        let mut style = StyleContext::default();
        let mut overrides = StyleOverrides::new();
        overrides.insert("font.serif".to_owned(), json!("Times New Roman"));
        style.update(&overrides).expect("update");
        assert_eq!(style.font_serif, vec!["Times New Roman".to_owned()]);
    }
}
