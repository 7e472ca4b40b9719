// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use crate::cell::Cell;
use crate::effects::{ColorSource, Effect, EffectCtx};
use crate::settings::{millis, BouncingBlockSettings};

pub struct BouncingBlock {
    colors: ColorSource,
    delay: Duration,
    pos: (i32, i32),
    dir: (i32, i32),
    drawn: Option<(u16, u16)>,
}

impl BouncingBlock {
    pub fn new(mut settings: BouncingBlockSettings) -> Self {
        settings.validate();
        Self {
            colors: ColorSource {
                true_color: settings.true_color,
                colors: settings.colors.bounds(),
                levels: settings.levels.bounds(),
            },
            delay: millis(settings.delay_ms),
            pos: (0, 0),
            dir: (1, 1),
            drawn: None,
        }
    }
}

/// Next coordinate along one axis, reversing `dir` at either edge.
fn bounce(pos: i32, dir: &mut i32, len: i32) -> i32 {
    if len <= 1 {
        return 0;
    }
    let next = pos + *dir;
    if next < 0 || next >= len {
        *dir = -*dir;
        pos + *dir
    } else {
        next
    }
}

impl Effect for BouncingBlock {
    fn name(&self) -> &'static str {
        "bouncingblock"
    }

    fn prepare(&mut self, ctx: &mut EffectCtx<'_>) {
        ctx.frame.clear();
        self.pos = (ctx.width() as i32 / 2, ctx.height() as i32 / 2);
        self.dir = (1, 1);
        self.drawn = None;
    }

    fn render_frame(&mut self, ctx: &mut EffectCtx<'_>) -> Duration {
        let (w, h) = (ctx.width() as i32, ctx.height() as i32);
        if ctx.resized() || w == 0 || h == 0 {
            return self.delay;
        }

        if let Some((x, y)) = self.drawn.take() {
            let blank = Cell::blank(ctx.frame.background());
            ctx.frame.set(x, y, blank);
        }

        let color = self.colors.sample(ctx.rng);
        let (x, y) = (self.pos.0 as u16, self.pos.1 as u16);
        ctx.frame
            .set(x, y, Cell::blank(self.colors.mode(ctx.color_mode).render(color)));
        self.drawn = Some((x, y));

        self.pos = (
            bounce(self.pos.0, &mut self.dir.0, w),
            bounce(self.pos.1, &mut self.dir.1, h),
        );
        self.delay
    }
}
