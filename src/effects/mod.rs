// Copyright (c) 2026 rezky_nightky

pub mod bouncingblock;
pub mod colorbleed;
pub mod matrixbleed;
pub mod ramp;
pub mod typewriter;

use std::time::Duration;

use rand::rngs::StdRng;
use rand::Rng;

use crate::color::{ChannelBounds, LevelBounds, Rgb};
use crate::control::ResizeListener;
use crate::error::{Result, SaverError};
use crate::frame::Frame;
use crate::runtime::{default_to_ascii, ColorMode};
use crate::settings::Settings;

use self::bouncingblock::BouncingBlock;
use self::colorbleed::ColorBleed;
use self::matrixbleed::MatrixBleed;
use self::ramp::Ramp;
use self::typewriter::Typewriter;

/// Everything an effect may touch during one call.
pub struct EffectCtx<'a> {
    pub frame: &'a mut Frame,
    pub rng: &'a mut StdRng,
    pub color_mode: ColorMode,
    pub resize: &'a ResizeListener,
}

impl EffectCtx<'_> {
    /// True when the terminal changed size since the frame was built.
    /// Effects check this before writing.
    pub fn resized(&self) -> bool {
        self.resize.was_resized()
    }

    pub fn width(&self) -> u16 {
        self.frame.width
    }

    pub fn height(&self) -> u16 {
        self.frame.height
    }
}

pub trait Effect {
    fn name(&self) -> &'static str;

    /// Clears the screen and resets all per-run state. Called again after
    /// every resize.
    fn prepare(&mut self, ctx: &mut EffectCtx<'_>);

    /// Draws one frame and returns how long the driver should wait.
    fn render_frame(&mut self, ctx: &mut EffectCtx<'_>) -> Duration;

    fn teardown(&mut self, _ctx: &mut EffectCtx<'_>) {}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectKind {
    ColorBleed,
    MatrixBleed,
    Ramp,
    BouncingBlock,
    Typewriter,
}

impl EffectKind {
    pub const ALL: [EffectKind; 5] = [
        EffectKind::ColorBleed,
        EffectKind::MatrixBleed,
        EffectKind::Ramp,
        EffectKind::BouncingBlock,
        EffectKind::Typewriter,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EffectKind::ColorBleed => "colorbleed",
            EffectKind::MatrixBleed => "matrixbleed",
            EffectKind::Ramp => "ramp",
            EffectKind::BouncingBlock => "bouncingblock",
            EffectKind::Typewriter => "typewriter",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            EffectKind::ColorBleed => "colored blocks fall down columns and fade out",
            EffectKind::MatrixBleed => "green glyph trails fall down columns and fade out",
            EffectKind::Ramp => "a color ramp drawn across the screen, one column at a time",
            EffectKind::BouncingBlock => "a block bouncing off the edges in random colors",
            EffectKind::Typewriter => "text typed out at a human pace",
        }
    }

    /// Case-insensitive; dashes and underscores are ignored.
    pub fn parse(s: &str) -> Result<EffectKind> {
        let key: String = s
            .trim()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        EffectKind::ALL
            .into_iter()
            .find(|k| k.name() == key)
            .ok_or_else(|| SaverError::UnknownEffect(s.to_string()))
    }
}

/// Builds a ready-to-run effect. Settings are validated here, once.
pub fn build_effect(kind: EffectKind, settings: &Settings) -> Result<Box<dyn Effect>> {
    let effect: Box<dyn Effect> = match kind {
        EffectKind::ColorBleed => Box::new(ColorBleed::new(settings.color_bleed.clone())),
        EffectKind::MatrixBleed => Box::new(MatrixBleed::new(
            settings.matrix_bleed.clone(),
            default_to_ascii(),
        )?),
        EffectKind::Ramp => Box::new(Ramp::new(settings.ramp.clone())),
        EffectKind::BouncingBlock => Box::new(BouncingBlock::new(settings.bouncing_block.clone())),
        EffectKind::Typewriter => Box::new(Typewriter::new(settings.typewriter.clone())?),
    };
    tracing::debug!(effect = effect.name(), "effect built");
    Ok(effect)
}

/// Random colors either from RGB bounds or from a range of xterm-256 indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorSource {
    pub true_color: bool,
    pub colors: ChannelBounds,
    pub levels: LevelBounds,
}

impl ColorSource {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Rgb {
        if self.true_color {
            self.colors.sample(rng)
        } else {
            self.levels.sample(rng)
        }
    }

    /// Palette colors are shown on the 256-color palette even on a truecolor
    /// terminal.
    pub fn mode(&self, mode: ColorMode) -> ColorMode {
        if self.true_color {
            mode
        } else {
            mode.cap(ColorMode::Color256)
        }
    }
}
