/// RGB color value with hex formatting and terminal conversions.
use std::fmt;
use std::str::FromStr;

/// An 8-bit-per-channel RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Formats the color as `#RRGGBB` with uppercase digits.
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseColorError {
    #[error("expected 6 hex digits, got {0}")]
    InvalidLength(usize),
    #[error("invalid hex digits in {0:?}")]
    InvalidHex(String),
}

impl FromStr for Color {
    type Err = ParseColorError;

    /// Parses `#RRGGBB` (the `#` is optional, digits are case-insensitive).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let hex = value.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return Err(ParseColorError::InvalidLength(hex.len()));
        }
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ParseColorError::InvalidHex(value.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ParseColorError::InvalidHex(value.to_string()))
        };
        Ok(Color::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl From<(u8, u8, u8)> for Color {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Color::new(r, g, b)
    }
}

impl From<Color> for ratatui::style::Color {
    fn from(color: Color) -> Self {
        ratatui::style::Color::Rgb(color.r, color.g, color.b)
    }
}

impl From<Color> for crossterm::style::Color {
    fn from(color: Color) -> Self {
        crossterm::style::Color::Rgb {
            r: color.r,
            g: color.g,
            b: color.b,
        }
    }
}
