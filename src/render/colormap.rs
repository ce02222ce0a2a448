//! Colormaps for the main matrix and categorical palettes for metadata tracks.

use anyhow::{Result, anyhow, bail};
use plotters::prelude::*;

/// Microsoft Office (2013+) chart series palette.
const OFFICE10: [RGBColor; 10] = [
    RGBColor(68, 114, 196),  // blue      (#4472C4)
    RGBColor(237, 125, 49),  // orange    (#ED7D31)
    RGBColor(165, 165, 165), // gray      (#A5A5A5)
    RGBColor(255, 192, 0),   // gold      (#FFC000)
    RGBColor(91, 155, 213),  // light blue(#5B9BD5)
    RGBColor(112, 173, 71),  // green     (#70AD47)
    RGBColor(38, 68, 120),   // dark blue (#264478)
    RGBColor(158, 72, 14),   // dark org. (#9E480E)
    RGBColor(99, 99, 99),    // dark gray (#636363)
    RGBColor(153, 115, 0),   // brownish  (#997300)
];

/// d3 category20.
const CATEGORY20: [RGBColor; 20] = [
    RGBColor(31, 119, 180),
    RGBColor(174, 199, 232),
    RGBColor(255, 127, 14),
    RGBColor(255, 187, 120),
    RGBColor(44, 160, 44),
    RGBColor(152, 223, 138),
    RGBColor(214, 39, 40),
    RGBColor(255, 152, 150),
    RGBColor(148, 103, 189),
    RGBColor(197, 176, 213),
    RGBColor(140, 86, 75),
    RGBColor(196, 156, 148),
    RGBColor(227, 119, 194),
    RGBColor(247, 182, 210),
    RGBColor(127, 127, 127),
    RGBColor(199, 199, 199),
    RGBColor(188, 189, 34),
    RGBColor(219, 219, 141),
    RGBColor(23, 190, 207),
    RGBColor(158, 218, 229),
];

/// First entries of the glasbey maximally-distinct palette.
const GLASBEY: [RGBColor; 16] = [
    RGBColor(215, 0, 0),
    RGBColor(140, 60, 255),
    RGBColor(2, 136, 0),
    RGBColor(0, 172, 199),
    RGBColor(152, 255, 0),
    RGBColor(255, 127, 209),
    RGBColor(108, 0, 79),
    RGBColor(255, 165, 48),
    RGBColor(0, 0, 157),
    RGBColor(134, 112, 104),
    RGBColor(0, 73, 66),
    RGBColor(79, 42, 0),
    RGBColor(0, 253, 207),
    RGBColor(188, 183, 255),
    RGBColor(149, 180, 122),
    RGBColor(192, 4, 185),
];

/// Continuous colormap defined by evenly spaced stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Colormap {
    stops: &'static [(u8, u8, u8)],
}

const COOLWARM: &[(u8, u8, u8)] = &[(59, 76, 192), (221, 221, 221), (180, 4, 38)];
const VIRIDIS: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];
const GREYS: &[(u8, u8, u8)] = &[(255, 255, 255), (0, 0, 0)];
const REDS: &[(u8, u8, u8)] = &[(255, 245, 240), (251, 106, 74), (103, 0, 13)];
const BLUES: &[(u8, u8, u8)] = &[(247, 251, 255), (107, 174, 214), (8, 48, 107)];

impl Colormap {
    /// Look up a colormap by name (case-insensitive). `None` selects coolwarm.
    pub fn by_name(name: Option<&str>) -> Result<Self> {
        let stops = match name.map(|n| n.to_ascii_lowercase()).as_deref() {
            None | Some("coolwarm") => COOLWARM,
            Some("viridis") => VIRIDIS,
            Some("greys") | Some("grays") => GREYS,
            Some("reds") => REDS,
            Some("blues") => BLUES,
            Some(other) => bail!("unknown colormap {:?} for main data", other),
        };
        Ok(Self { stops })
    }

    /// Color at `t` in `[0, 1]`; values outside are clamped.
    pub fn at(&self, t: f64) -> RGBColor {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
        let n = self.stops.len() - 1;
        let pos = t * n as f64;
        let i = (pos.floor() as usize).min(n - 1);
        let f = pos - i as f64;
        let (a, b) = (self.stops[i], self.stops[i + 1]);
        let lerp = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * f).round() as u8;
        RGBColor(lerp(a.0, b.0), lerp(a.1, b.1), lerp(a.2, b.2))
    }
}

/// Categorical palette for metadata tracks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Palette {
    colors: &'static [RGBColor],
}

impl Palette {
    /// `None` selects the Office palette.
    pub fn by_name(name: Option<&str>) -> Result<Self> {
        let colors: &'static [RGBColor] = match name.map(|n| n.to_ascii_lowercase()).as_deref() {
            None | Some("office") => &OFFICE10,
            Some("category20") => &CATEGORY20,
            Some("glasbey") => &GLASBEY,
            Some(other) => return Err(anyhow!("unknown colormap {:?} for metadata", other)),
        };
        Ok(Self { colors })
    }

    #[inline]
    pub fn pick(&self, idx: usize) -> RGBColor {
        self.colors[idx % self.colors.len()]
    }
}

/// Parse `#rrggbb` or `#rgb`.
pub fn parse_hex_color(s: &str) -> Result<RGBColor> {
    let hex = s.trim().trim_start_matches('#');
    if !hex.is_ascii() {
        bail!("invalid color {:?}, expected #rrggbb", s);
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => bail!("invalid color {:?}, expected #rrggbb", s),
    };
    let byte = |i: usize| {
        u8::from_str_radix(&expanded[i..i + 2], 16)
            .map_err(|_| anyhow!("invalid color {:?}, expected #rrggbb", s))
    };
    Ok(RGBColor(byte(0)?, byte(2)?, byte(4)?))
}

/// Relative luminance in `[0, 1]`, used to pick readable overlays.
pub fn luminance(c: RGBColor) -> f64 {
    (0.2126 * c.0 as f64 + 0.7152 * c.1 as f64 + 0.0722 * c.2 as f64) / 255.0
}
