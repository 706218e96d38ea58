use brief_core::{BriefError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An sRGB color, written as `#rrggbb` in configuration and SVG.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses `#rrggbb` or `rrggbb`.
    pub fn parse(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BriefError::Chart(format!("invalid color '{s}', expected #rrggbb")));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| BriefError::Chart(format!("invalid color '{s}': {e}")))
        };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Uppercase hex without the leading `#`, as DrawingML expects.
    pub fn hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Mixes `self` over `background` with the given opacity.
    pub(crate) fn over(&self, background: Rgb, alpha: f64) -> Rgb {
        let mix = |fg: u8, bg: u8| (fg as f64 * alpha + bg as f64 * (1.0 - alpha)).round() as u8;
        Rgb::new(mix(self.r, background.r), mix(self.g, background.g), mix(self.b, background.b))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = BriefError;

    fn from_str(s: &str) -> Result<Self> {
        Rgb::parse(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = BriefError;

    fn try_from(value: String) -> Result<Self> {
        Rgb::parse(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

/// House colors shared by every figure and the document styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    /// Bars, box outlines, headings and the diagram title.
    pub primary: Rgb,
    /// Box fill.
    pub fill: Rgb,
    /// Arrows and axis lines.
    pub connector: Rgb,
    pub text: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Rgb::new(0x00, 0x4c, 0x6d),
            fill: Rgb::new(0xe6, 0xf3, 0xff),
            connector: Rgb::new(0x55, 0x55, 0x55),
            text: Rgb::new(0x22, 0x22, 0x22),
        }
    }
}
