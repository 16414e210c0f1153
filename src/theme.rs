//! Color theme for the banner, the answer and the waiting indicator.
//!
//! A `Theme` is built once from configuration and handed by value to
//! everything that draws. There is no process-wide palette.

use crossterm::style::{Attribute, Color, ContentStyle};
use serde::{Deserialize, Serialize};

/// Theme selector as written in the config file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
}

/// A 24-bit color, kept independent of any one terminal crate's color type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub fn to_color(self) -> Color {
        Color::Rgb {
            r: self.0,
            g: self.1,
            b: self.2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub kind: ThemeKind,
    /// Banner art and level-one headings.
    pub accent: Rgb,
    /// Indicator footer, quote and the question badge background.
    pub muted: Rgb,
    pub foreground: Rgb,
    pub heading: Rgb,
    pub code: Rgb,
    pub emphasis: Rgb,
    pub error: Rgb,
}

impl Theme {
    pub fn from_kind(kind: ThemeKind) -> Self {
        match kind {
            ThemeKind::Dark => Self::dark(),
            ThemeKind::Light => Self::light(),
        }
    }

    /// Dracula palette.
    pub fn dark() -> Self {
        Self {
            kind: ThemeKind::Dark,
            accent: Rgb(0x50, 0xfa, 0x7b),
            muted: Rgb(0x44, 0x47, 0x5a),
            foreground: Rgb(0xf8, 0xf8, 0xf2),
            heading: Rgb(0xbd, 0x93, 0xf9),
            code: Rgb(0xf1, 0xfa, 0x8c),
            emphasis: Rgb(0xff, 0x79, 0xc6),
            error: Rgb(0xff, 0x55, 0x55),
        }
    }

    pub fn light() -> Self {
        Self {
            kind: ThemeKind::Light,
            accent: Rgb(0x14, 0x71, 0x0a),
            muted: Rgb(0x9a, 0x9c, 0xa8),
            foreground: Rgb(0x1f, 0x1f, 0x28),
            heading: Rgb(0x64, 0x4a, 0xc9),
            code: Rgb(0x84, 0x6e, 0x15),
            emphasis: Rgb(0xa3, 0x14, 0x4d),
            error: Rgb(0xcb, 0x3a, 0x2a),
        }
    }

    pub fn accent_style(&self) -> ContentStyle {
        ContentStyle {
            foreground_color: Some(self.accent.to_color()),
            ..Default::default()
        }
    }

    pub fn muted_style(&self) -> ContentStyle {
        ContentStyle {
            foreground_color: Some(self.muted.to_color()),
            ..Default::default()
        }
    }

    pub fn quote_style(&self) -> ContentStyle {
        ContentStyle {
            foreground_color: Some(self.muted.to_color()),
            attributes: Attribute::Italic.into(),
            ..Default::default()
        }
    }

    pub fn badge_style(&self) -> ContentStyle {
        ContentStyle {
            foreground_color: Some(self.foreground.to_color()),
            background_color: Some(self.muted.to_color()),
            attributes: Attribute::Bold.into(),
            ..Default::default()
        }
    }

    pub fn error_style(&self) -> ContentStyle {
        ContentStyle {
            foreground_color: Some(self.error.to_color()),
            ..Default::default()
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_kind() {
        assert_eq!(Theme::from_kind(ThemeKind::Light).kind, ThemeKind::Light);
        assert_eq!(Theme::default(), Theme::dark());
    }

    #[test]
    fn test_rgb_to_color() {
        assert_eq!(
            Rgb(1, 2, 3).to_color(),
            Color::Rgb { r: 1, g: 2, b: 3 }
        );
    }
}
