use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

static HEX_COLOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#?([0-9a-fA-F]{6})([0-9a-fA-F]{2})?$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Color {
    pub const fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Parse `RRGGBB` or `RRGGBBAA`, optionally prefixed with `#`.
    pub fn from_hex(value: &str) -> Option<Self> {
        let caps = HEX_COLOR_RE.captures(value.trim())?;
        let rgb = caps.get(1)?.as_str();
        let channel = |hex: &str| u8::from_str_radix(hex, 16).ok();
        let alpha = match caps.get(2) {
            Some(alpha) => channel(alpha.as_str())?,
            None => 255,
        };
        Some(Self::rgba(
            channel(&rgb[0..2])?,
            channel(&rgb[2..4])?,
            channel(&rgb[4..6])?,
            alpha,
        ))
    }

    /// Three channels get an opaque alpha.
    pub fn from_channels(channels: &[u8]) -> Option<Self> {
        match channels {
            [r, g, b] => Some(Self::rgba(*r, *g, *b, 255)),
            [r, g, b, a] => Some(Self::rgba(*r, *g, *b, *a)),
            _ => None,
        }
    }

    pub fn to_svg(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }

    pub fn opacity(self) -> f32 {
        self.alpha as f32 / 255.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    Right,
    Center,
}

/// Look of the tooltip boxes and their text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    /// TrueType/OpenType file used for measuring; system fonts otherwise.
    pub font_path: Option<PathBuf>,
    pub font_family: String,
    pub font_size: f32,
    pub font_color: Color,
    pub tooltip_color: Color,
    /// Pixels between lines of text.
    pub line_spacing: f32,
    /// Pixels between the text and the box border.
    pub padding: f32,
    pub text_align: TextAlign,
}

impl Theme {
    pub fn skald_default() -> Self {
        Self {
            font_path: None,
            font_family: "DejaVu Sans, Verdana, Arial, sans-serif".to_string(),
            font_size: 15.0,
            font_color: Color::rgba(255, 255, 255, 255),
            tooltip_color: Color::rgba(50, 50, 185, 255),
            line_spacing: 5.0,
            padding: 5.0,
            text_align: TextAlign::Right,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::skald_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_colors() {
        assert_eq!(Color::from_hex("#3232B9"), Some(Color::rgba(50, 50, 185, 255)));
        assert_eq!(Color::from_hex("3232b980"), Some(Color::rgba(50, 50, 185, 128)));
        assert_eq!(Color::from_hex("#12345"), None);
        assert_eq!(Color::from_hex("#GG0000"), None);
    }

    #[test]
    fn parses_channel_lists() {
        assert_eq!(Color::from_channels(&[1, 2, 3]), Some(Color::rgba(1, 2, 3, 255)));
        assert_eq!(Color::from_channels(&[1, 2, 3, 4]), Some(Color::rgba(1, 2, 3, 4)));
        assert_eq!(Color::from_channels(&[1, 2]), None);
    }

    #[test]
    fn svg_color_strings() {
        let color = Color::rgba(50, 50, 185, 51);
        assert_eq!(color.to_svg(), "#3232B9");
        assert!((color.opacity() - 0.2).abs() < 1e-6);
    }
}
