use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{FigureError, FigureResult};

/// Largest accepted field width or precision.
const MAX_FIELD: usize = 100;

/// printf-style numeric format such as `%.2f`, `%d`, `%.1e` or `%g`.
///
/// Exactly one conversion is allowed; literal text around it and `%%` are
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormat {
    source: String,
    prefix: String,
    suffix: String,
    spec: ConversionSpec,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ConversionSpec {
    plus_sign: bool,
    zero_pad: bool,
    left_align: bool,
    width: usize,
    precision: Option<usize>,
    kind: ConversionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConversionKind {
    Fixed,
    Exponent { upper: bool },
    General { upper: bool },
    Integer,
}

impl NumberFormat {
    pub fn parse(source: &str) -> FigureResult<Self> {
        let invalid = |reason: &str| {
            FigureError::InvalidArgument(format!("invalid number format `{source}`: {reason}"))
        };

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut spec = None;
        let mut chars = source.chars().peekable();

        while let Some(ch) = chars.next() {
            if ch != '%' {
                if spec.is_some() {
                    suffix.push(ch);
                } else {
                    prefix.push(ch);
                }
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                if spec.is_some() {
                    suffix.push('%');
                } else {
                    prefix.push('%');
                }
                continue;
            }
            if spec.is_some() {
                return Err(invalid("more than one conversion"));
            }

            let mut parsed = ConversionSpec {
                plus_sign: false,
                zero_pad: false,
                left_align: false,
                width: 0,
                precision: None,
                kind: ConversionKind::Fixed,
            };
            while let Some(&flag) = chars.peek() {
                match flag {
                    '+' => parsed.plus_sign = true,
                    '0' => parsed.zero_pad = true,
                    '-' => parsed.left_align = true,
                    ' ' | '#' => {}
                    _ => break,
                }
                chars.next();
            }
            parsed.width = take_digits(&mut chars)
                .ok_or_else(|| invalid(&format!("width exceeds {MAX_FIELD}")))?
                .unwrap_or(0);
            if chars.peek() == Some(&'.') {
                chars.next();
                let precision = take_digits(&mut chars)
                    .ok_or_else(|| invalid(&format!("precision exceeds {MAX_FIELD}")))?;
                parsed.precision = Some(precision.unwrap_or(0));
            }
            parsed.kind = match chars.next() {
                Some('f' | 'F') => ConversionKind::Fixed,
                Some('e') => ConversionKind::Exponent { upper: false },
                Some('E') => ConversionKind::Exponent { upper: true },
                Some('g') => ConversionKind::General { upper: false },
                Some('G') => ConversionKind::General { upper: true },
                Some('d' | 'i') => ConversionKind::Integer,
                Some(other) => return Err(invalid(&format!("unsupported conversion `{other}`"))),
                None => return Err(invalid("dangling `%`")),
            };
            spec = Some(parsed);
        }

        let spec = spec.ok_or_else(|| invalid("no numeric conversion"))?;
        Ok(Self {
            source: source.to_owned(),
            prefix,
            suffix,
            spec,
        })
    }

    /// `%.{decimals}f`.
    #[must_use]
    pub fn fixed(decimals: usize) -> Self {
        Self {
            source: format!("%.{decimals}f"),
            prefix: String::new(),
            suffix: String::new(),
            spec: ConversionSpec {
                plus_sign: false,
                zero_pad: false,
                left_align: false,
                width: 0,
                precision: Some(decimals),
                kind: ConversionKind::Fixed,
            },
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Formats `value`, optionally rendering negatives with U+2212.
    #[must_use]
    pub fn format(&self, value: f64, unicode_minus: bool) -> String {
        let body = self.format_number(value);
        let body = if unicode_minus {
            body.replacen('-', "\u{2212}", 1)
        } else {
            body
        };
        format!("{}{body}{}", self.prefix, self.suffix)
    }

    fn format_number(&self, value: f64) -> String {
        if !value.is_finite() {
            let text = if value.is_nan() {
                "nan"
            } else if value > 0.0 {
                "inf"
            } else {
                "-inf"
            };
            return self.pad(text.to_owned(), false);
        }

        let spec = self.spec;
        let negative = value.is_sign_negative() && value != 0.0;
        let magnitude = value.abs();
        let digits = match spec.kind {
            ConversionKind::Fixed => format!("{magnitude:.prec$}", prec = spec.precision.unwrap_or(6)),
            ConversionKind::Exponent { upper } => {
                format_exponent(magnitude, spec.precision.unwrap_or(6), upper)
            }
            ConversionKind::General { upper } => {
                format_general(magnitude, spec.precision.unwrap_or(6), upper)
            }
            ConversionKind::Integer => format!("{:.0}", magnitude.trunc()),
        };

        // Values that round to zero keep no sign, e.g. "%.1f" of -0.01 is "0.0".
        let is_zero = digits.chars().all(|ch| matches!(ch, '0' | '.'));
        let sign = if negative && !is_zero {
            "-"
        } else if spec.plus_sign {
            "+"
        } else {
            ""
        };
        self.pad(format!("{sign}{digits}"), true)
    }

    fn pad(&self, text: String, numeric: bool) -> String {
        let spec = self.spec;
        let len = text.chars().count();
        if len >= spec.width {
            return text;
        }
        let fill = spec.width - len;
        if spec.left_align {
            return format!("{text}{}", " ".repeat(fill));
        }
        if spec.zero_pad && numeric {
            let (sign, rest) = match text.chars().next() {
                Some(first @ ('-' | '+')) => (first.to_string(), text[1..].to_owned()),
                _ => (String::new(), text),
            };
            return format!("{sign}{}{rest}", "0".repeat(fill));
        }
        format!("{}{text}", " ".repeat(fill))
    }
}

/// Reads a run of decimal digits; `None` when the number exceeds `MAX_FIELD`.
fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<Option<usize>> {
    let mut value: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|ch| ch.to_digit(10)) {
        let next = value
            .unwrap_or(0)
            .checked_mul(10)
            .and_then(|shifted| shifted.checked_add(digit as usize))
            .filter(|&next| next <= MAX_FIELD)?;
        value = Some(next);
        chars.next();
    }
    Some(value)
}

fn format_exponent(magnitude: f64, precision: usize, upper: bool) -> String {
    let raw = format!("{magnitude:.precision$e}");
    let (mantissa, exponent) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exponent: i32 = exponent.parse().unwrap_or(0);
    let sign = if exponent < 0 { '-' } else { '+' };
    let marker = if upper { 'E' } else { 'e' };
    format!("{mantissa}{marker}{sign}{:02}", exponent.abs())
}

fn format_general(magnitude: f64, precision: usize, upper: bool) -> String {
    let precision = precision.max(1);
    if magnitude == 0.0 {
        return "0".to_owned();
    }

    // The exponent after rounding to `precision` significant digits decides
    // between fixed and exponential notation.
    let rounded = format!("{magnitude:.prec$e}", prec = precision - 1);
    let exponent: i32 = rounded
        .split_once('e')
        .and_then(|(_, exp)| exp.parse().ok())
        .unwrap_or(0);

    if exponent < -4 || exponent >= precision as i32 {
        let text = format_exponent(magnitude, precision - 1, upper);
        let marker = if upper { 'E' } else { 'e' };
        match text.split_once(marker) {
            Some((mantissa, exp)) => format!("{}{marker}{exp}", strip_zeros(mantissa)),
            None => text,
        }
    } else {
        let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
        strip_zeros(&format!("{magnitude:.decimals$}")).to_owned()
    }
}

fn strip_zeros(text: &str) -> &str {
    if !text.contains('.') {
        return text;
    }
    text.trim_end_matches('0').trim_end_matches('.')
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self::fixed(2)
    }
}

impl FromStr for NumberFormat {
    type Err = FigureError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        Self::parse(source)
    }
}

impl fmt::Display for NumberFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for NumberFormat {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

impl<'de> Deserialize<'de> for NumberFormat {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let source = String::deserialize(deserializer)?;
        Self::parse(&source).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(spec: &str, value: f64) -> String {
        NumberFormat::parse(spec).expect("format").format(value, false)
    }

    #[test]
    fn fixed_precision() {
        assert_eq!(fmt("%.2f", 3.14159), "3.14");
        assert_eq!(fmt("%.1f", -0.01), "0.0");
        assert_eq!(fmt("%+.1f", 2.0), "+2.0");
        assert_eq!(fmt("%f", 1.5), "1.500000");
    }

    #[test]
    fn exponent_uses_two_digit_exponent() {
        assert_eq!(fmt("%.1e", 12345.0), "1.2e+04");
        assert_eq!(fmt("%.2E", 0.00123), "1.23E-03");
    }

    #[test]
    fn general_switches_notation() {
        assert_eq!(fmt("%g", 0.5), "0.5");
        assert_eq!(fmt("%g", 1_000_000.0), "1e+06");
        assert_eq!(fmt("%g", 0.0001), "0.0001");
        assert_eq!(fmt("%.3g", 1234.5), "1.23e+03");
    }

    #[test]
    fn integer_truncates_and_pads() {
        assert_eq!(fmt("%d", 7.9), "7");
        assert_eq!(fmt("%03d", 7.0), "007");
        assert_eq!(fmt("%4d", -7.0), "  -7");
    }

    #[test]
    fn integer_beyond_u64_keeps_its_digits() {
        assert_eq!(fmt("%d", 1e25), "10000000000000000905969664");
        assert_eq!(fmt("%d", -2.0e20), "-200000000000000000000");
    }

    #[test]
    fn oversized_width_or_precision_is_rejected() {
        for source in ["%99999999999999999999999d", "%.1000000000f", "%101d"] {
            let err = NumberFormat::parse(source).expect_err("oversized field");
            assert!(matches!(err, FigureError::InvalidArgument(_)), "{source}");
        }
        assert_eq!(fmt("%100d", 1.0).len(), 100);
    }

    #[test]
    fn literal_text_and_percent_escape_survive() {
        assert_eq!(fmt("T=%.0f K", 300.4), "T=300 K");
        assert_eq!(fmt("%.0f%%", 42.0), "42%");
    }

    #[test]
    fn unicode_minus_replaces_sign() {
        let format = NumberFormat::parse("%.1f").expect("format");
        assert_eq!(format.format(-1.5, true), "\u{2212}1.5");
    }

    #[test]
    fn rejects_formats_without_single_conversion() {
        assert!(NumberFormat::parse("value").is_err());
        assert!(NumberFormat::parse("%.1f %.2f").is_err());
        assert!(NumberFormat::parse("%s").is_err());
        assert!(NumberFormat::parse("%").is_err());
    }
}
