// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use rand::Rng;

use crate::charset::GlyphSet;
use crate::color::Rgb;
use crate::effects::{Effect, EffectCtx};
use crate::error::Result;
use crate::particle::{FieldParams, PaintStyle, ParticleField, ParticleSource};
use crate::settings::{millis, MatrixBleedSettings};

struct Trail {
    color: Rgb,
    glyphs: Vec<char>,
}

impl ParticleSource for Trail {
    fn color<R: Rng>(&mut self, _rng: &mut R) -> Rgb {
        self.color
    }

    fn glyph<R: Rng>(&mut self, rng: &mut R) -> Option<char> {
        if self.glyphs.is_empty() {
            return None;
        }
        self.glyphs.get(rng.random_range(0..self.glyphs.len())).copied()
    }
}

/// Glyph trails of a single color falling down free columns.
pub struct MatrixBleed {
    trail: Trail,
    params: FieldParams,
    delay: Duration,
    field: ParticleField,
}

impl MatrixBleed {
    pub fn new(mut settings: MatrixBleedSettings, default_to_ascii: bool) -> Result<Self> {
        settings.validate();
        let set = GlyphSet::parse(&settings.charset, default_to_ascii)?;
        Ok(Self {
            trail: Trail {
                color: settings.rgb(),
                glyphs: set.chars(),
            },
            params: FieldParams {
                drop_chance: settings.drop_chance as u32,
                max_fade_steps: settings.max_fade_steps as u32,
                style: PaintStyle::Glyph,
            },
            delay: millis(settings.delay_ms),
            field: ParticleField::new(),
        })
    }
}

impl Effect for MatrixBleed {
    fn name(&self) -> &'static str {
        "matrixbleed"
    }

    fn prepare(&mut self, ctx: &mut EffectCtx<'_>) {
        ctx.frame.clear();
        self.field.clear();
    }

    fn render_frame(&mut self, ctx: &mut EffectCtx<'_>) -> Duration {
        let resized = ctx.resized();
        self.field.tick(
            ctx.rng,
            ctx.frame,
            ctx.color_mode,
            &self.params,
            &mut self.trail,
            resized,
        );
        self.delay
    }

    fn teardown(&mut self, _ctx: &mut EffectCtx<'_>) {
        tracing::debug!(live = self.field.len(), "matrixbleed torn down");
        self.field.clear();
    }
}
