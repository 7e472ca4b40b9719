// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use rand::Rng;

use crate::cell::Cell;
use crate::color::ColorStepper;
use crate::effects::{ColorSource, Effect, EffectCtx};
use crate::settings::{millis, RampSettings};

/// Draws a horizontal gradient band between two random colors, one column per
/// frame, then pauses and starts over.
pub struct Ramp {
    start: ColorSource,
    end: ColorSource,
    delay: Duration,
    next_ramp_delay: Duration,
    stepper: ColorStepper,
    column: u16,
    band: (u16, u16),
}

impl Ramp {
    pub fn new(mut settings: RampSettings) -> Self {
        settings.validate();
        let start = ColorSource {
            true_color: settings.true_color,
            colors: settings.start.bounds(),
            levels: settings.start_levels.bounds(),
        };
        let end = ColorSource {
            true_color: settings.true_color,
            colors: settings.end.bounds(),
            levels: settings.end_levels.bounds(),
        };
        Self {
            stepper: ColorStepper::new(start.colors.min, end.colors.min, 1),
            start,
            end,
            delay: millis(settings.delay_ms),
            next_ramp_delay: millis(settings.next_ramp_delay_ms),
            column: 0,
            band: (0, 0),
        }
    }

    fn new_ramp<R: Rng>(&mut self, rng: &mut R, width: u16) {
        let from = self.start.sample(rng);
        let to = self.end.sample(rng);
        self.stepper = ColorStepper::new(from, to, width.saturating_sub(1).max(1) as u32);
        self.column = 0;
        tracing::trace!(?from, ?to, "new ramp");
    }
}

/// Rows `[top, bottom)` covered by the ramp: the middle half of the screen,
/// or all of it when the screen is very short.
fn band(height: u16) -> (u16, u16) {
    if height < 4 {
        (0, height)
    } else {
        (height / 4, height - height / 4)
    }
}

impl Effect for Ramp {
    fn name(&self) -> &'static str {
        "ramp"
    }

    fn prepare(&mut self, ctx: &mut EffectCtx<'_>) {
        ctx.frame.clear();
        self.band = band(ctx.height());
        let width = ctx.width();
        self.new_ramp(ctx.rng, width);
    }

    fn render_frame(&mut self, ctx: &mut EffectCtx<'_>) -> Duration {
        if ctx.resized() {
            return self.delay;
        }
        let width = ctx.width();
        if self.column >= width {
            ctx.frame.clear();
            self.new_ramp(ctx.rng, width);
            return self.delay;
        }

        let color = if self.column == 0 {
            self.stepper.current()
        } else {
            self.stepper.advance()
        };
        let cell = Cell::blank(self.start.mode(ctx.color_mode).render(color));
        for y in self.band.0..self.band.1 {
            ctx.frame.set(self.column, y, cell);
        }
        self.column += 1;

        if self.column >= width {
            self.next_ramp_delay
        } else {
            self.delay
        }
    }
}
