// Copyright (c) 2026 rezky_nightky

use std::time::Duration;

use rand::Rng;

use crate::cell::Cell;
use crate::color::Rgb;
use crate::effects::{Effect, EffectCtx};
use crate::error::Result;
use crate::settings::{millis, TypewriterSettings};

/// Characters per word when turning words-per-minute into a key delay.
const CHARS_PER_WORD: u64 = 5;

/// Types a text out one character per frame at a random human pace.
pub struct Typewriter {
    text: Vec<char>,
    color: Rgb,
    wpm: (u64, u64),
    new_screen_delay: Duration,
    index: usize,
    cursor: (u16, u16),
    page_done: bool,
}

impl Typewriter {
    /// Reads `text_file` now when one is configured.
    pub fn new(mut settings: TypewriterSettings) -> Result<Self> {
        settings.validate();
        let text = settings.resolve_text()?;
        tracing::debug!(chars = text.chars().count(), "typewriter text loaded");
        Ok(Self {
            text: text.chars().collect(),
            color: settings.rgb(),
            wpm: (settings.min_wpm as u64, settings.max_wpm as u64),
            new_screen_delay: millis(settings.new_screen_delay_ms),
            index: 0,
            cursor: (0, 0),
            page_done: false,
        })
    }

    fn key_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let wpm = rng.random_range(self.wpm.0..=self.wpm.1).max(1);
        Duration::from_millis(60_000 / (wpm * CHARS_PER_WORD))
    }

    fn new_page(&mut self, ctx: &mut EffectCtx<'_>) {
        ctx.frame.clear();
        self.cursor = (0, 0);
        if self.index >= self.text.len() {
            self.index = 0;
        }
        self.page_done = false;
    }

    fn end_page(&mut self) -> Duration {
        self.page_done = true;
        self.new_screen_delay
    }
}

impl Effect for Typewriter {
    fn name(&self) -> &'static str {
        "typewriter"
    }

    fn prepare(&mut self, ctx: &mut EffectCtx<'_>) {
        self.index = 0;
        self.new_page(ctx);
    }

    fn render_frame(&mut self, ctx: &mut EffectCtx<'_>) -> Duration {
        if ctx.resized() {
            return Duration::ZERO;
        }
        let (w, h) = (ctx.width(), ctx.height());
        if w == 0 || h == 0 || self.text.is_empty() {
            return self.new_screen_delay;
        }
        if self.page_done {
            self.new_page(ctx);
        }
        let Some(&ch) = self.text.get(self.index) else {
            return self.end_page();
        };

        match ch {
            '\n' => {
                self.index += 1;
                self.cursor = (0, self.cursor.1 + 1);
                if self.cursor.1 >= h {
                    return self.end_page();
                }
            }
            c if c.is_control() && c != '\t' => self.index += 1,
            c => {
                if self.cursor.0 >= w {
                    self.cursor = (0, self.cursor.1 + 1);
                }
                if self.cursor.1 >= h {
                    // typed again at the top of the next page
                    return self.end_page();
                }
                let glyph = if c == '\t' { ' ' } else { c };
                let cell = Cell::glyph(
                    glyph,
                    ctx.color_mode.render(self.color),
                    ctx.frame.background(),
                );
                ctx.frame.set(self.cursor.0, self.cursor.1, cell);
                self.cursor.0 += 1;
                self.index += 1;
            }
        }
        self.key_delay(ctx.rng)
    }
}
