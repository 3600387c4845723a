//! Named and custom colour maps.
//!
//! Built-in maps are stored as anchor stops and linearly interpolated; the
//! `_r` suffix on any registered name selects the reversed map.

use crate::error::{FigureError, FigureResult};
use crate::render::Color;

/// How a colour map turns a normalized value into a colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColormapKind {
    /// Interpolated between stops.
    Continuous,
    /// Discrete entries, one per equal-width bucket.
    Listed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    name: String,
    kind: ColormapKind,
    stops: Vec<(f64, Color)>,
    levels: Option<usize>,
}

const VIRIDIS: &[&str] = &[
    "#440154", "#472d7b", "#3b528b", "#2c728e", "#21918c", "#28ae80", "#5ec962", "#addc30",
    "#fde725",
];
const PLASMA: &[&str] = &[
    "#0d0887", "#41049d", "#6a00a8", "#8f0da4", "#b12a90", "#cc4778", "#e16462", "#f2844b",
    "#fca636", "#fcce25", "#f0f921",
];
const INFERNO: &[&str] = &[
    "#000004", "#1b0c41", "#4a0c6b", "#781c6d", "#a52c60", "#cf4446", "#ed6925", "#fb9b06",
    "#f7d13d", "#fcffa4",
];
const MAGMA: &[&str] = &[
    "#000004", "#180f3d", "#440f76", "#721f81", "#9e2f7f", "#cd4071", "#f1605d", "#fd9668",
    "#feca8d", "#fcfdbf",
];
const YLGNBU: &[&str] = &[
    "#ffffd9", "#edf8b1", "#c7e9b4", "#7fcdbb", "#41b6c4", "#1d91c0", "#225ea8", "#253494",
    "#081d58",
];
const RDBU: &[&str] = &[
    "#67001f", "#b2182b", "#d6604d", "#f4a582", "#fddbc7", "#f7f7f7", "#d1e5f0", "#92c5de",
    "#4393c3", "#2166ac", "#053061",
];
const COOLWARM: &[&str] = &[
    "#3b4cc0", "#6688ee", "#88bbff", "#b8d0f9", "#dddddd", "#f5c4ad", "#f49a7b", "#de604d",
    "#b40426",
];
const BLUES: &[&str] = &[
    "#f7fbff", "#deebf7", "#c6dbef", "#9ecae1", "#6baed6", "#4292c6", "#2171b5", "#08519c",
    "#08306b",
];
const REDS: &[&str] = &[
    "#fff5f0", "#fee0d2", "#fcbba1", "#fc9272", "#fb6a4a", "#ef3b2c", "#cb181d", "#a50f15",
    "#67000d",
];
const GREYS: &[&str] = &[
    "#ffffff", "#f0f0f0", "#d9d9d9", "#bdbdbd", "#969696", "#737373", "#525252", "#252525",
    "#000000",
];
const GRAY: &[&str] = &["#000000", "#ffffff"];
const TAB10: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];
const HOT: &[(f64, &str)] = &[
    (0.0, "#0a0000"),
    (0.365, "#ff0000"),
    (0.746, "#ffff00"),
    (1.0, "#ffffff"),
];
const JET: &[(f64, &str)] = &[
    (0.0, "#00007f"),
    (0.125, "#0000ff"),
    (0.375, "#00ffff"),
    (0.625, "#ffff00"),
    (0.875, "#ff0000"),
    (1.0, "#7f0000"),
];

/// Names accepted by [`Colormap::named`] (each also with an `_r` suffix).
pub const COLORMAP_NAMES: &[&str] = &[
    "viridis", "plasma", "inferno", "magma", "YlGnBu", "RdBu", "coolwarm", "Blues", "Reds",
    "Greys", "gray", "hot", "jet", "tab10",
];

impl Colormap {
    /// Looks up a registered map; `name_r` yields the reversed map.
    pub fn named(name: &str) -> FigureResult<Self> {
        if let Some(base) = name.strip_suffix("_r") {
            return Ok(Self::named(base)?.reversed());
        }

        let evenly = |stops: &[&str]| -> FigureResult<Vec<(f64, Color)>> {
            let colors = stops
                .iter()
                .map(|stop| Color::parse(stop))
                .collect::<FigureResult<Vec<_>>>()?;
            Ok(evenly_spaced(&colors))
        };
        let positioned = |stops: &[(f64, &str)]| -> FigureResult<Vec<(f64, Color)>> {
            stops
                .iter()
                .map(|(position, stop)| -> FigureResult<(f64, Color)> {
                    Ok((*position, Color::parse(stop)?))
                })
                .collect()
        };

        let (kind, stops) = match name {
            "viridis" => (ColormapKind::Continuous, evenly(VIRIDIS)?),
            "plasma" => (ColormapKind::Continuous, evenly(PLASMA)?),
            "inferno" => (ColormapKind::Continuous, evenly(INFERNO)?),
            "magma" => (ColormapKind::Continuous, evenly(MAGMA)?),
            "YlGnBu" => (ColormapKind::Continuous, evenly(YLGNBU)?),
            "RdBu" => (ColormapKind::Continuous, evenly(RDBU)?),
            "coolwarm" => (ColormapKind::Continuous, evenly(COOLWARM)?),
            "Blues" => (ColormapKind::Continuous, evenly(BLUES)?),
            "Reds" => (ColormapKind::Continuous, evenly(REDS)?),
            "Greys" => (ColormapKind::Continuous, evenly(GREYS)?),
            "gray" | "grey" => (ColormapKind::Continuous, evenly(GRAY)?),
            "hot" => (ColormapKind::Continuous, positioned(HOT)?),
            "jet" => (ColormapKind::Continuous, positioned(JET)?),
            "tab10" => (ColormapKind::Listed, evenly(TAB10)?),
            other => {
                return Err(FigureError::InvalidArgument(format!(
                    "unknown colormap `{other}`"
                )));
            }
        };

        Ok(Self {
            name: name.to_owned(),
            kind,
            stops,
            levels: None,
        })
    }

    /// Linear-segmented map through `colors`, quantized to `levels` entries.
    pub fn from_colors(name: impl Into<String>, colors: &[Color], levels: usize) -> FigureResult<Self> {
        if colors.len() < 2 {
            return Err(FigureError::InvalidArgument(
                "a custom colormap needs at least two colors".to_owned(),
            ));
        }
        if levels < 2 {
            return Err(FigureError::InvalidArgument(
                "a custom colormap needs at least two levels".to_owned(),
            ));
        }
        for color in colors {
            color.validate()?;
        }
        Ok(Self {
            name: name.into(),
            kind: ColormapKind::Continuous,
            stops: evenly_spaced(colors),
            levels: Some(levels),
        })
    }

    /// Discrete map cycling through `colors`.
    pub fn listed(name: impl Into<String>, colors: &[Color]) -> FigureResult<Self> {
        if colors.is_empty() {
            return Err(FigureError::InvalidArgument(
                "a listed colormap needs at least one color".to_owned(),
            ));
        }
        Ok(Self {
            name: name.into(),
            kind: ColormapKind::Listed,
            stops: evenly_spaced(colors),
            levels: None,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn kind(&self) -> ColormapKind {
        self.kind
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        let name = match self.name.strip_suffix("_r") {
            Some(base) => base.to_owned(),
            None => format!("{}_r", self.name),
        };
        Self {
            name,
            kind: self.kind,
            stops: self
                .stops
                .iter()
                .rev()
                .map(|(position, color)| (1.0 - position, *color))
                .collect(),
            levels: self.levels,
        }
    }

    /// Colour at normalized position `t` (clamped to `[0, 1]`; NaN maps to 0).
    #[must_use]
    pub fn at(&self, t: f64) -> Color {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        if self.kind == ColormapKind::Listed {
            let count = self.stops.len();
            let index = ((t * count as f64).floor() as usize).min(count - 1);
            return self.stops[index].1;
        }

        let t = match self.levels {
            Some(levels) => {
                let bucket = ((t * levels as f64).floor() as usize).min(levels - 1);
                bucket as f64 / (levels - 1) as f64
            }
            None => t,
        };

        let upper = self
            .stops
            .iter()
            .position(|(position, _)| *position >= t)
            .unwrap_or(self.stops.len() - 1);
        if upper == 0 {
            return self.stops[0].1;
        }
        let (p0, c0) = self.stops[upper - 1];
        let (p1, c1) = self.stops[upper];
        if p1 <= p0 {
            return c1;
        }
        Color::lerp(c0, c1, (t - p0) / (p1 - p0))
    }

    /// Colour for `value` normalized against `[vmin, vmax]`.
    #[must_use]
    pub fn map(&self, value: f64, vmin: f64, vmax: f64) -> Color {
        self.at(normalize(value, vmin, vmax))
    }

    /// Colours at each normalized position.
    #[must_use]
    pub fn sample(&self, positions: &[f64]) -> Vec<Color> {
        positions.iter().map(|&t| self.at(t)).collect()
    }
}

/// `value` mapped onto `[0, 1]` over `[vmin, vmax]`; a degenerate range maps to 0.
#[must_use]
pub fn normalize(value: f64, vmin: f64, vmax: f64) -> f64 {
    // Halved so spans near f64::MAX stay finite.
    let half_span = vmax / 2.0 - vmin / 2.0;
    if !half_span.is_finite() || half_span.abs() < f64::EPSILON / 2.0 {
        return 0.0;
    }
    (value / 2.0 - vmin / 2.0) / half_span
}

fn evenly_spaced(colors: &[Color]) -> Vec<(f64, Color)> {
    let last = colors.len().saturating_sub(1).max(1) as f64;
    colors
        .iter()
        .enumerate()
        .map(|(index, color)| (index as f64 / last, *color))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_registered_name_resolves_both_ways() {
        for name in COLORMAP_NAMES {
            Colormap::named(name).expect("registered map");
            Colormap::named(&format!("{name}_r")).expect("reversed map");
        }
    }

    #[test]
    fn reversed_map_swaps_end_stops() {
        let map = Colormap::named("YlGnBu").expect("map");
        let reversed = Colormap::named("YlGnBu_r").expect("reversed");
        assert_eq!(map.at(0.0), reversed.at(1.0));
        assert_eq!(map.at(1.0), reversed.at(0.0));
        assert_eq!(reversed.name(), "YlGnBu_r");
    }

    #[test]
    fn normalize_handles_extreme_ranges() {
        assert!((normalize(0.0, -1e308, 1e308) - 0.5).abs() < 1e-12);
        assert!((normalize(1e308, -1e308, 1e308) - 1.0).abs() < 1e-12);
        assert_eq!(normalize(3.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = Colormap::named("not-a-map").expect_err("unknown");
        assert!(matches!(err, FigureError::InvalidArgument(_)));
    }

    #[test]
    fn quantized_custom_map_uses_discrete_levels() {
        let map = Colormap::from_colors("bw", &[Color::BLACK, Color::WHITE], 2).expect("map");
        assert_eq!(map.at(0.2), Color::BLACK);
        assert_eq!(map.at(0.7), Color::WHITE);
    }

    #[test]
    fn listed_map_buckets_positions() {
        let map = Colormap::named("tab10").expect("tab10");
        assert_eq!(map.at(0.0).to_hex(), "#1f77b4");
        assert_eq!(map.at(0.99).to_hex(), "#17becf");
    }
}
