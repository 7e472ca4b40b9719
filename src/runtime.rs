// Copyright (c) 2026 rezky_nightky

use std::env;

use crossterm::style::Color;

use crate::color::{rgb_to_ansi256, rgb_to_color16, Rgb};
use crate::error::SaverError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ColorMode {
    Mono,
    Color16,
    Color256,
    TrueColor,
}

impl ColorMode {
    /// Maps an RGB color onto what this mode can show. Mono yields no color.
    pub fn render(self, rgb: Rgb) -> Option<Color> {
        match self {
            ColorMode::Mono => None,
            ColorMode::Color16 => Some(rgb_to_color16(rgb)),
            ColorMode::Color256 => Some(Color::AnsiValue(rgb_to_ansi256(rgb))),
            ColorMode::TrueColor => Some(Color::Rgb {
                r: rgb.r,
                g: rgb.g,
                b: rgb.b,
            }),
        }
    }

    /// Limits this mode to at most `limit`; palette-only effects stay on the
    /// 256-color palette even on a truecolor terminal.
    pub fn cap(self, limit: ColorMode) -> ColorMode {
        self.min(limit)
    }

    pub fn label(self) -> &'static str {
        match self {
            ColorMode::TrueColor => "24-bit truecolor",
            ColorMode::Color256 => "8-bit (256-color)",
            ColorMode::Color16 => "16-color",
            ColorMode::Mono => "mono",
        }
    }

    pub fn from_flag(v: u16) -> Result<ColorMode, SaverError> {
        match v {
            0 => Ok(ColorMode::Mono),
            16 => Ok(ColorMode::Color16),
            8 | 256 => Ok(ColorMode::Color256),
            24 | 32 => Ok(ColorMode::TrueColor),
            other => Err(SaverError::InvalidColorMode(other)),
        }
    }
}

pub fn detect_color_mode_auto() -> ColorMode {
    let colorterm = env::var("COLORTERM")
        .unwrap_or_default()
        .to_ascii_lowercase();
    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    color_mode_from_env(&colorterm, &term)
}

fn color_mode_from_env(colorterm: &str, term: &str) -> ColorMode {
    if colorterm.contains("truecolor") || colorterm.contains("24bit") {
        return ColorMode::TrueColor;
    }
    if term == "dumb" {
        return ColorMode::Mono;
    }
    ColorMode::Color256
}

pub fn default_to_ascii() -> bool {
    let lang = env::var("LANG").unwrap_or_default();
    !lang.to_ascii_uppercase().contains("UTF")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colorterm_truecolor_wins_over_term() {
        assert_eq!(color_mode_from_env("truecolor", "dumb"), ColorMode::TrueColor);
        assert_eq!(color_mode_from_env("", "dumb"), ColorMode::Mono);
        assert_eq!(color_mode_from_env("", "xterm-256color"), ColorMode::Color256);
    }

    #[test]
    fn cap_never_upgrades() {
        assert_eq!(ColorMode::TrueColor.cap(ColorMode::Color256), ColorMode::Color256);
        assert_eq!(ColorMode::Color16.cap(ColorMode::Color256), ColorMode::Color16);
    }

    #[test]
    fn colormode_flag_accepts_aliases_only() {
        assert_eq!(ColorMode::from_flag(32).unwrap(), ColorMode::TrueColor);
        assert_eq!(ColorMode::from_flag(8).unwrap(), ColorMode::Color256);
        assert!(ColorMode::from_flag(7).is_err());
    }

    #[test]
    fn mono_renders_nothing() {
        assert_eq!(ColorMode::Mono.render(Rgb::new(1, 2, 3)), None);
        assert_eq!(
            ColorMode::TrueColor.render(Rgb::new(1, 2, 3)),
            Some(Color::Rgb { r: 1, g: 2, b: 3 })
        );
    }
}
