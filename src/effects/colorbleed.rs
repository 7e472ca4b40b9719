// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use rand::Rng;

use crate::color::Rgb;
use crate::effects::{ColorSource, Effect, EffectCtx};
use crate::particle::{FieldParams, PaintStyle, ParticleField, ParticleSource};
use crate::settings::{millis, ColorBleedSettings};

impl ParticleSource for ColorSource {
    fn color<R: Rng>(&mut self, rng: &mut R) -> Rgb {
        self.sample(rng)
    }
}

/// Solid colored blocks that fall down free columns and fade to black.
pub struct ColorBleed {
    source: ColorSource,
    params: FieldParams,
    delay: Duration,
    field: ParticleField,
}

impl ColorBleed {
    pub fn new(mut settings: ColorBleedSettings) -> Self {
        settings.validate();
        Self {
            source: ColorSource {
                true_color: settings.true_color,
                colors: settings.colors.bounds(),
                levels: settings.levels.bounds(),
            },
            params: FieldParams {
                drop_chance: settings.drop_chance as u32,
                max_fade_steps: settings.max_fade_steps as u32,
                style: PaintStyle::Block,
            },
            delay: millis(settings.delay_ms),
            field: ParticleField::new(),
        }
    }
}

impl Effect for ColorBleed {
    fn name(&self) -> &'static str {
        "colorbleed"
    }

    fn prepare(&mut self, ctx: &mut EffectCtx<'_>) {
        ctx.frame.clear();
        self.field.clear();
        tracing::debug!(width = ctx.width(), height = ctx.height(), "colorbleed prepared");
    }

    fn render_frame(&mut self, ctx: &mut EffectCtx<'_>) -> Duration {
        let resized = ctx.resized();
        let mode = self.source.mode(ctx.color_mode);
        self.field.tick(
            ctx.rng,
            ctx.frame,
            mode,
            &self.params,
            &mut self.source,
            resized,
        );
        self.delay
    }

    fn teardown(&mut self, _ctx: &mut EffectCtx<'_>) {
        tracing::debug!(live = self.field.len(), "colorbleed torn down");
        self.field.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::testing::Harness;
    use crate::settings::RgbRange;
    use crossterm::style::Color;

    fn always_dropping() -> ColorBleedSettings {
        ColorBleedSettings {
            drop_chance: 100,
            ..ColorBleedSettings::default()
        }
    }

    #[test]
    fn never_holds_more_particles_than_columns() {
        let mut h = Harness::new(6, 4);
        let mut fx = ColorBleed::new(always_dropping());
        h.prepare(&mut fx);
        for _ in 0..200 {
            h.frame(&mut fx);
            assert!(fx.field.len() <= 6);
            assert_eq!(fx.field.len(), fx.field.reserved().len());
        }
    }

    #[test]
    fn colors_stay_inside_configured_bounds() {
        let settings = ColorBleedSettings {
            colors: RgbRange {
                min: [200, 0, 10],
                max: [210, 0, 20],
            },
            ..always_dropping()
        };
        let mut h = Harness::new(8, 30);
        let mut fx = ColorBleed::new(settings);
        h.prepare(&mut fx);
        for _ in 0..10 {
            h.frame(&mut fx);
        }
        for p in fx.field.particles() {
            let c = p.color();
            assert!((200..=210).contains(&c.r));
            assert_eq!(c.g, 0);
            assert!((10..=20).contains(&c.b));
        }
    }

    #[test]
    fn palette_mode_paints_ansi_values() {
        let settings = ColorBleedSettings {
            true_color: false,
            ..always_dropping()
        };
        let mut h = Harness::new(4, 4);
        let mut fx = ColorBleed::new(settings);
        h.prepare(&mut fx);
        h.frame(&mut fx);
        let col = fx.field.particles()[0].column();
        assert!(matches!(
            h.frame.get(col, 0).unwrap().bg,
            Some(Color::AnsiValue(_))
        ));
    }

    #[test]
    fn resize_mid_fall_skips_the_frame_and_resets() {
        let mut h = Harness::new(10, 10);
        let mut fx = ColorBleed::new(always_dropping());
        h.prepare(&mut fx);
        for _ in 0..3 {
            h.frame(&mut fx);
        }
        let covered: Vec<_> = fx
            .field
            .particles()
            .iter()
            .map(|p| p.covered().to_vec())
            .collect();
        h.frame.clear_dirty();

        h.resize.notify(5, 3);
        h.frame(&mut fx);
        let after: Vec<_> = fx
            .field
            .particles()
            .iter()
            .map(|p| p.covered().to_vec())
            .collect();
        assert_eq!(covered, after);
        assert!(!h.frame.has_changes());

        h.rebuild(&mut fx);
        assert!(fx.field.is_empty());
        assert_eq!((h.frame.width, h.frame.height), (5, 3));
        h.frame(&mut fx);
        assert_eq!(fx.field.len(), 1);
    }

    #[test]
    fn returns_the_configured_delay() {
        let settings = ColorBleedSettings {
            delay_ms: -5,
            ..ColorBleedSettings::default()
        };
        let mut h = Harness::new(3, 3);
        let mut fx = ColorBleed::new(settings);
        h.prepare(&mut fx);
        assert_eq!(
            h.frame(&mut fx),
            Duration::from_millis(ColorBleedSettings::DEFAULT_DELAY_MS as u64)
        );
    }
}
