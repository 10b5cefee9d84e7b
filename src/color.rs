use crate::error::{GlobeError, Result};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }

    /// Manhattan distance over the three channels.
    pub fn manhattan(self, other: Rgb) -> u32 {
        (self.r as i32 - other.r as i32).unsigned_abs()
            + (self.g as i32 - other.g as i32).unsigned_abs()
            + (self.b as i32 - other.b as i32).unsigned_abs()
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + t * (b as f64 - a as f64)).round() as u8;
        Rgb::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
        )
    }
}

impl FromStr for Rgb {
    type Err = GlobeError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s
            .strip_prefix('#')
            .filter(|h| h.len() == 6 && h.is_ascii())
            .ok_or_else(|| GlobeError::InvalidColor(s.to_string()))?;
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| GlobeError::InvalidColor(s.to_string()))
        };
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = GlobeError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Deserializes an optional color override. An empty string counts as unset.
pub fn optional_color<'de, D>(deserializer: D) -> std::result::Result<Option<Rgb>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// Number of entries every named palette is expanded to.
const PALETTE_SIZE: usize = 256;
/// Largest entry count a palette name may ask for
const MAX_PALETTE_SIZE: usize = 1024;

/// Anchor stops for the named palettes, evenly spaced from low to high.
const TURBO_STOPS: &[Rgb] = &[
    Rgb::new(48, 18, 59),
    Rgb::new(70, 107, 227),
    Rgb::new(40, 187, 236),
    Rgb::new(50, 241, 152),
    Rgb::new(164, 252, 60),
    Rgb::new(237, 208, 58),
    Rgb::new(251, 128, 34),
    Rgb::new(210, 49, 5),
    Rgb::new(122, 4, 3),
];

const VIRIDIS_STOPS: &[Rgb] = &[
    Rgb::new(68, 1, 84),
    Rgb::new(59, 82, 139),
    Rgb::new(33, 145, 140),
    Rgb::new(94, 201, 98),
    Rgb::new(253, 231, 37),
];

const INFERNO_STOPS: &[Rgb] = &[
    Rgb::new(0, 0, 4),
    Rgb::new(87, 16, 110),
    Rgb::new(188, 55, 84),
    Rgb::new(249, 142, 9),
    Rgb::new(252, 255, 164),
];

const MAGMA_STOPS: &[Rgb] = &[
    Rgb::new(0, 0, 4),
    Rgb::new(81, 18, 124),
    Rgb::new(183, 55, 121),
    Rgb::new(252, 137, 97),
    Rgb::new(252, 253, 191),
];

const PLASMA_STOPS: &[Rgb] = &[
    Rgb::new(13, 8, 135),
    Rgb::new(126, 3, 168),
    Rgb::new(204, 71, 120),
    Rgb::new(248, 149, 64),
    Rgb::new(240, 249, 33),
];

const SPECTRAL_STOPS: &[Rgb] = &[
    Rgb::new(94, 79, 162),
    Rgb::new(50, 136, 189),
    Rgb::new(102, 194, 165),
    Rgb::new(171, 221, 164),
    Rgb::new(230, 245, 152),
    Rgb::new(254, 224, 139),
    Rgb::new(253, 174, 97),
    Rgb::new(244, 109, 67),
    Rgb::new(213, 62, 79),
    Rgb::new(158, 1, 66),
];

const TERRAIN_STOPS: &[Rgb] = &[
    Rgb::new(51, 51, 153),
    Rgb::new(0, 153, 255),
    Rgb::new(0, 204, 102),
    Rgb::new(255, 255, 153),
    Rgb::new(128, 92, 84),
    Rgb::new(255, 255, 255),
];

const RDBU_STOPS: &[Rgb] = &[
    Rgb::new(5, 48, 97),
    Rgb::new(67, 147, 195),
    Rgb::new(247, 247, 247),
    Rgb::new(214, 96, 77),
    Rgb::new(103, 0, 31),
];

const GREYS_STOPS: &[Rgb] = &[Rgb::new(0, 0, 0), Rgb::new(255, 255, 255)];

/// An ordered color table, low values first.
#[derive(Clone, Debug, PartialEq)]
pub struct Palette {
    pub name: String,
    pub colors: Vec<Rgb>,
}

impl Palette {
    fn from_stops(name: &str, stops: &[Rgb], size: usize) -> Self {
        let colors = (0..size)
            .map(|i| {
                let t = i as f64 / (size - 1) as f64;
                let seg = t * (stops.len() - 1) as f64;
                let k = (seg as usize).min(stops.len() - 2);
                stops[k].lerp(stops[k + 1], seg - k as f64)
            })
            .collect();
        Palette {
            name: name.to_string(),
            colors,
        }
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Palette index for a normalized position in `[0, 1]`.
    pub fn index_at(&self, t: f64) -> usize {
        let last = self.colors.len() - 1;
        (t.clamp(0.0, 1.0) * last as f64).round() as usize
    }

    pub fn color_at(&self, t: f64) -> Rgb {
        self.colors[self.index_at(t)]
    }

    /// Index of the entry closest to `color` by Manhattan distance. Ties keep
    /// the lower index.
    pub fn nearest_index(&self, color: Rgb) -> usize {
        let mut best = 0;
        let mut best_distance = u32::MAX;
        for (i, &c) in self.colors.iter().enumerate() {
            let d = c.manhattan(color);
            if d < best_distance {
                best_distance = d;
                best = i;
            }
        }
        best
    }
}

/// Looks up a named palette. Names are matched case-insensitively, and a trailing
/// entry count (as in `Turbo256` or `Viridis11`) selects the table size.
pub fn palette(name: &str) -> Result<Palette> {
    let lower = name.to_ascii_lowercase();
    let base = lower.trim_end_matches(|c: char| c.is_ascii_digit());
    let size = match &lower[base.len()..] {
        "" => PALETTE_SIZE,
        digits => digits
            .parse::<usize>()
            .ok()
            .filter(|n| (2..=MAX_PALETTE_SIZE).contains(n))
            .ok_or_else(|| GlobeError::UnknownPalette(name.to_string()))?,
    };
    let stops = match base {
        "turbo" => TURBO_STOPS,
        "viridis" => VIRIDIS_STOPS,
        "inferno" => INFERNO_STOPS,
        "magma" => MAGMA_STOPS,
        "plasma" => PLASMA_STOPS,
        "spectral" => SPECTRAL_STOPS,
        "terrain" => TERRAIN_STOPS,
        "rdbu" => RDBU_STOPS,
        "greys" | "grays" => GREYS_STOPS,
        _ => return Err(GlobeError::UnknownPalette(name.to_string())),
    };
    Ok(Palette::from_stops(name, stops, size))
}

/// Resolves the color range. Bounds that are unset or NaN come from the finite
/// data extent; with no finite data the range falls back to `[0, 1]`.
pub fn value_range(values: &[f64], vmin: Option<f64>, vmax: Option<f64>) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for &v in values.iter().filter(|v| v.is_finite()) {
        lo = lo.min(v);
        hi = hi.max(v);
    }
    if !lo.is_finite() {
        lo = 0.0;
        hi = 1.0;
    }
    let lo = vmin.filter(|v| v.is_finite()).unwrap_or(lo);
    let hi = vmax.filter(|v| v.is_finite()).unwrap_or(hi);
    (lo, hi)
}

/// Maps a value to its palette color. Non-finite values take `nan_color`; a
/// degenerate range maps everything to the palette midpoint.
pub fn value_to_color(value: f64, palette: &Palette, vmin: f64, vmax: f64, nan_color: Rgb) -> Rgb {
    if !value.is_finite() {
        return nan_color;
    }
    let span = vmax - vmin;
    let t = if span.abs() < f64::EPSILON {
        0.5
    } else {
        (value - vmin) / span
    };
    palette.color_at(t)
}

/// A palette bound to a resolved value range, shared by the mesh, the legend
/// and pixel picking so all three agree on the mapping.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorScale {
    pub palette: Palette,
    pub vmin: f64,
    pub vmax: f64,
    pub nan_color: Rgb,
}

impl ColorScale {
    pub fn new(
        palette: Palette,
        values: &[f64],
        vmin: Option<f64>,
        vmax: Option<f64>,
        nan_color: Rgb,
    ) -> Self {
        let (vmin, vmax) = value_range(values, vmin, vmax);
        ColorScale {
            palette,
            vmin,
            vmax,
            nan_color,
        }
    }

    pub fn color_of(&self, value: f64) -> Rgb {
        value_to_color(value, &self.palette, self.vmin, self.vmax, self.nan_color)
    }

    /// Value represented by palette entry `index`
    pub fn value_at_index(&self, index: usize) -> f64 {
        let last = self.palette.len().saturating_sub(1).max(1);
        self.vmin + index as f64 / last as f64 * (self.vmax - self.vmin)
    }
}
