// Copyright (c) 2026 rezky_nightky

//! Effect settings read from `config.toml`.
//!
//! Every numeric field is read as `i64`, the full width of a TOML integer, so
//! out-of-range values in the file never fail to parse. `validate()` clamps
//! them once when an effect is constructed.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::color::{ChannelBounds, LevelBounds, Rgb};
use crate::effects::EffectKind;
use crate::error::{Result, SaverError};

pub const MAX_DELAY_MS: i64 = 60_000;
const MAX_FADE_STEPS: i64 = 1_000;
const MAX_WPM: i64 = 1_000;

pub const DEFAULT_TYPEWRITER_TEXT: &str = "The quick brown fox jumps over the lazy dog. \
Pack my box with five dozen liquor jugs. \
How vexingly quick daft zebras jump!";

fn clamp_channel(v: i64) -> i64 {
    v.clamp(0, 255)
}

fn clamp_delay(v: i64, default: i64) -> i64 {
    if v < 0 {
        default
    } else {
        v.min(MAX_DELAY_MS)
    }
}

fn clamp_percent(v: i64) -> i64 {
    v.clamp(0, 100)
}

fn clamp_fade_steps(v: i64, default: i64) -> i64 {
    if v < 1 {
        default
    } else {
        v.min(MAX_FADE_STEPS)
    }
}

fn rgb_from(c: [i64; 3]) -> Rgb {
    Rgb::new(
        clamp_channel(c[0]) as u8,
        clamp_channel(c[1]) as u8,
        clamp_channel(c[2]) as u8,
    )
}

pub fn millis(ms: i64) -> Duration {
    Duration::from_millis(ms.max(0) as u64)
}

/// Per-channel `[min, max]` pair for truecolor sampling.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RgbRange {
    pub min: [i64; 3],
    pub max: [i64; 3],
}

impl Default for RgbRange {
    fn default() -> Self {
        Self {
            min: [0, 0, 0],
            max: [255, 255, 255],
        }
    }
}

impl RgbRange {
    pub fn validate(&mut self) {
        self.min = self.min.map(clamp_channel);
        for (max, &min) in self.max.iter_mut().zip(&self.min) {
            *max = clamp_channel(*max).max(min);
        }
    }

    pub fn bounds(&self) -> ChannelBounds {
        ChannelBounds {
            min: rgb_from(self.min),
            max: rgb_from(self.max),
        }
    }
}

/// `[min, max]` pair of xterm-256 palette indices.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LevelRange {
    pub min: i64,
    pub max: i64,
}

impl Default for LevelRange {
    fn default() -> Self {
        Self { min: 0, max: 255 }
    }
}

impl LevelRange {
    pub fn validate(&mut self) {
        self.min = clamp_channel(self.min);
        self.max = clamp_channel(self.max).max(self.min);
    }

    pub fn bounds(&self) -> LevelBounds {
        LevelBounds {
            min: clamp_channel(self.min) as u8,
            max: clamp_channel(self.max) as u8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ColorBleedSettings {
    pub true_color: bool,
    pub delay_ms: i64,
    pub max_fade_steps: i64,
    pub drop_chance: i64,
    pub colors: RgbRange,
    pub levels: LevelRange,
}

impl ColorBleedSettings {
    pub const DEFAULT_DELAY_MS: i64 = 10;
    pub const DEFAULT_FADE_STEPS: i64 = 25;

    pub fn validate(&mut self) {
        self.delay_ms = clamp_delay(self.delay_ms, Self::DEFAULT_DELAY_MS);
        self.max_fade_steps = clamp_fade_steps(self.max_fade_steps, Self::DEFAULT_FADE_STEPS);
        self.drop_chance = clamp_percent(self.drop_chance);
        self.colors.validate();
        self.levels.validate();
    }
}

impl Default for ColorBleedSettings {
    fn default() -> Self {
        Self {
            true_color: true,
            delay_ms: Self::DEFAULT_DELAY_MS,
            max_fade_steps: Self::DEFAULT_FADE_STEPS,
            drop_chance: 40,
            colors: RgbRange::default(),
            levels: LevelRange::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MatrixBleedSettings {
    pub delay_ms: i64,
    pub max_fade_steps: i64,
    pub drop_chance: i64,
    pub color: [i64; 3],
    pub charset: String,
}

impl MatrixBleedSettings {
    pub const DEFAULT_DELAY_MS: i64 = 10;
    pub const DEFAULT_FADE_STEPS: i64 = 25;

    pub fn validate(&mut self) {
        self.delay_ms = clamp_delay(self.delay_ms, Self::DEFAULT_DELAY_MS);
        self.max_fade_steps = clamp_fade_steps(self.max_fade_steps, Self::DEFAULT_FADE_STEPS);
        self.drop_chance = clamp_percent(self.drop_chance);
        self.color = self.color.map(clamp_channel);
    }

    pub fn rgb(&self) -> Rgb {
        rgb_from(self.color)
    }
}

impl Default for MatrixBleedSettings {
    fn default() -> Self {
        Self {
            delay_ms: Self::DEFAULT_DELAY_MS,
            max_fade_steps: Self::DEFAULT_FADE_STEPS,
            drop_chance: 40,
            color: [0, 255, 0],
            charset: "auto".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RampSettings {
    pub true_color: bool,
    pub delay_ms: i64,
    pub next_ramp_delay_ms: i64,
    pub start: RgbRange,
    pub end: RgbRange,
    pub start_levels: LevelRange,
    pub end_levels: LevelRange,
}

impl RampSettings {
    pub const DEFAULT_DELAY_MS: i64 = 20;
    pub const DEFAULT_NEXT_RAMP_DELAY_MS: i64 = 250;

    pub fn validate(&mut self) {
        self.delay_ms = clamp_delay(self.delay_ms, Self::DEFAULT_DELAY_MS);
        self.next_ramp_delay_ms =
            clamp_delay(self.next_ramp_delay_ms, Self::DEFAULT_NEXT_RAMP_DELAY_MS);
        self.start.validate();
        self.end.validate();
        self.start_levels.validate();
        self.end_levels.validate();
    }
}

impl Default for RampSettings {
    fn default() -> Self {
        Self {
            true_color: true,
            delay_ms: Self::DEFAULT_DELAY_MS,
            next_ramp_delay_ms: Self::DEFAULT_NEXT_RAMP_DELAY_MS,
            start: RgbRange::default(),
            end: RgbRange::default(),
            start_levels: LevelRange::default(),
            end_levels: LevelRange::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BouncingBlockSettings {
    pub true_color: bool,
    pub delay_ms: i64,
    pub colors: RgbRange,
    pub levels: LevelRange,
}

impl BouncingBlockSettings {
    pub const DEFAULT_DELAY_MS: i64 = 10;

    pub fn validate(&mut self) {
        self.delay_ms = clamp_delay(self.delay_ms, Self::DEFAULT_DELAY_MS);
        self.colors.validate();
        self.levels.validate();
    }
}

impl Default for BouncingBlockSettings {
    fn default() -> Self {
        Self {
            true_color: true,
            delay_ms: Self::DEFAULT_DELAY_MS,
            colors: RgbRange::default(),
            levels: LevelRange::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TypewriterSettings {
    pub min_wpm: i64,
    pub max_wpm: i64,
    pub new_screen_delay_ms: i64,
    pub text: String,
    pub text_file: Option<PathBuf>,
    pub color: [i64; 3],
}

impl TypewriterSettings {
    pub const DEFAULT_NEW_SCREEN_DELAY_MS: i64 = 3_000;

    pub fn validate(&mut self) {
        self.min_wpm = self.min_wpm.clamp(1, MAX_WPM);
        self.max_wpm = self.max_wpm.clamp(1, MAX_WPM).max(self.min_wpm);
        self.new_screen_delay_ms =
            clamp_delay(self.new_screen_delay_ms, Self::DEFAULT_NEW_SCREEN_DELAY_MS);
        self.color = self.color.map(clamp_channel);
    }

    pub fn rgb(&self) -> Rgb {
        rgb_from(self.color)
    }

    /// The text to type: the file contents when `text_file` is set.
    pub fn resolve_text(&self) -> Result<String> {
        match &self.text_file {
            Some(path) => fs::read_to_string(path).map_err(|source| SaverError::ReadText {
                path: path.clone(),
                source,
            }),
            None => Ok(self.text.clone()),
        }
    }
}

impl Default for TypewriterSettings {
    fn default() -> Self {
        Self {
            min_wpm: 50,
            max_wpm: 80,
            new_screen_delay_ms: Self::DEFAULT_NEW_SCREEN_DELAY_MS,
            text: DEFAULT_TYPEWRITER_TEXT.to_string(),
            text_file: None,
            color: [255, 255, 255],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub color_bleed: ColorBleedSettings,
    #[serde(default)]
    pub matrix_bleed: MatrixBleedSettings,
    #[serde(default)]
    pub ramp: RampSettings,
    #[serde(default)]
    pub bouncing_block: BouncingBlockSettings,
    #[serde(default)]
    pub typewriter: TypewriterSettings,
}

impl Settings {
    /// Loads settings from `explicit`, or from the default location.
    ///
    /// A missing file at the default location yields defaults; a missing
    /// explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let p = Self::config_path();
                if !p.exists() {
                    tracing::debug!(path = %p.display(), "no settings file, using defaults");
                    return Ok(Self::default());
                }
                p
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| SaverError::ReadSettings {
            path: path.clone(),
            source,
        })?;
        let settings = Self::from_toml(&text, &path)?;
        tracing::info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn from_toml(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|source| SaverError::ParseSettings {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("cellsaver")
            .join("config.toml")
    }

    /// Replaces the frame delay of one effect, as `--delay` does.
    pub fn override_delay(&mut self, kind: EffectKind, ms: i64) {
        match kind {
            EffectKind::ColorBleed => self.color_bleed.delay_ms = ms,
            EffectKind::MatrixBleed => self.matrix_bleed.delay_ms = ms,
            EffectKind::Ramp => self.ramp.delay_ms = ms,
            EffectKind::BouncingBlock => self.bouncing_block.delay_ms = ms,
            // The typewriter's pace comes from its words-per-minute range.
            EffectKind::Typewriter => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn parse(text: &str) -> Settings {
        Settings::from_toml(text, Path::new("test.toml")).unwrap()
    }

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(parse(""), Settings::default());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let s = parse(
            r#"
            [color_bleed]
            drop_chance = 75

            [color_bleed.colors]
            min = [10, 20, 30]
            "#,
        );
        assert_eq!(s.color_bleed.drop_chance, 75);
        assert_eq!(s.color_bleed.delay_ms, ColorBleedSettings::DEFAULT_DELAY_MS);
        assert_eq!(s.color_bleed.colors.min, [10, 20, 30]);
        assert_eq!(s.color_bleed.colors.max, [255, 255, 255]);
        assert_eq!(s.matrix_bleed, MatrixBleedSettings::default());
    }

    #[test]
    fn out_of_range_values_parse_and_clamp() {
        let mut s = parse(
            r#"
            [color_bleed]
            delay_ms = -5
            max_fade_steps = 0
            drop_chance = 250

            [color_bleed.colors]
            min = [-10, 300, 40]
            max = [500, 100, 20]

            [color_bleed.levels]
            min = 300
            max = -1
            "#,
        );
        s.color_bleed.validate();
        let cb = &s.color_bleed;
        assert_eq!(cb.delay_ms, ColorBleedSettings::DEFAULT_DELAY_MS);
        assert_eq!(cb.max_fade_steps, ColorBleedSettings::DEFAULT_FADE_STEPS);
        assert_eq!(cb.drop_chance, 100);
        assert_eq!(cb.colors.min, [0, 255, 40]);
        assert_eq!(cb.colors.max, [255, 255, 40]);
        assert_eq!(cb.levels, LevelRange { min: 255, max: 255 });
    }

    #[test]
    fn integers_beyond_i32_still_parse_and_clamp() {
        let mut s = parse(
            r#"
            [color_bleed.colors]
            max = [3000000000, -9000000000, 0]

            [color_bleed.levels]
            min = -4000000000
            max = 5000000000

            [matrix_bleed]
            color = [9000000000, 1, 2]
            "#,
        );
        s.color_bleed.validate();
        s.matrix_bleed.validate();
        assert_eq!(s.color_bleed.colors.max, [255, 0, 0]);
        assert_eq!(s.color_bleed.levels, LevelRange { min: 0, max: 255 });
        assert_eq!(s.matrix_bleed.rgb(), Rgb::new(255, 1, 2));
    }

    #[test]
    fn max_below_min_is_raised_to_min() {
        let mut r = RgbRange {
            min: [100, 0, 0],
            max: [50, 255, 255],
        };
        r.validate();
        assert_eq!(r.max, [100, 255, 255]);
        assert_eq!(r.min, [100, 0, 0]);
    }

    #[test]
    fn delay_is_capped() {
        let mut s = RampSettings {
            delay_ms: MAX_DELAY_MS * 4,
            ..RampSettings::default()
        };
        s.validate();
        assert_eq!(s.delay_ms, MAX_DELAY_MS);
    }

    #[test]
    fn typewriter_wpm_range_is_ordered() {
        let mut t = TypewriterSettings {
            min_wpm: 120,
            max_wpm: 30,
            ..TypewriterSettings::default()
        };
        t.validate();
        assert_eq!((t.min_wpm, t.max_wpm), (120, 120));
    }

    #[test]
    fn missing_text_file_is_reported() {
        let t = TypewriterSettings {
            text_file: Some(PathBuf::from("/definitely/not/here.txt")),
            ..TypewriterSettings::default()
        };
        assert!(matches!(t.resolve_text(), Err(SaverError::ReadText { .. })));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = Settings::load(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, SaverError::ReadSettings { .. }));
    }

    #[test]
    fn bad_toml_is_an_error() {
        let err = Settings::from_toml("[ramp\n", Path::new("x.toml")).unwrap_err();
        assert!(matches!(err, SaverError::ParseSettings { .. }));
    }

    #[test]
    fn delay_override_targets_one_effect() {
        let mut s = Settings::default();
        s.override_delay(EffectKind::Ramp, 99);
        assert_eq!(s.ramp.delay_ms, 99);
        assert_eq!(s.color_bleed.delay_ms, ColorBleedSettings::DEFAULT_DELAY_MS);
    }

    proptest! {
        #[test]
        fn validated_ranges_are_ordered_channels(
            min in any::<[i64; 3]>(),
            max in any::<[i64; 3]>(),
        ) {
            let mut r = RgbRange { min, max };
            r.validate();
            let channels = r.min.iter().zip(&r.max).zip(min.iter().zip(&max));
            for ((&lo, &hi), (&raw_lo, &raw_hi)) in channels {
                prop_assert!((0..=255).contains(&lo));
                prop_assert!((0..=255).contains(&hi));
                prop_assert!(lo <= hi);
                if clamp_channel(raw_hi) < clamp_channel(raw_lo) {
                    prop_assert_eq!(hi, lo);
                }
            }
        }
    }
}
