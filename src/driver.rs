// Copyright (c) 2026 rezky_nightky

//! The frame loop shared by every effect.

use std::io;
use std::time::{Duration, Instant};

use crossterm::style::Color;
use rand::rngs::StdRng;

use crate::control::{CancelToken, ResizeListener, Sleep};
use crate::effects::{Effect, EffectCtx};
use crate::error::Result;
use crate::frame::Frame;
use crate::runtime::ColorMode;

/// Something a finished frame can be shown on.
pub trait Surface {
    fn present(&mut self, frame: &mut Frame) -> io::Result<()>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DriverOptions {
    pub duration: Option<Duration>,
    pub max_frames: Option<u64>,
    pub background: Option<Color>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub frames: u64,
    pub resets: u64,
    pub elapsed: Duration,
}

fn ctx<'a>(
    frame: &'a mut Frame,
    rng: &'a mut StdRng,
    color_mode: ColorMode,
    resize: &'a ResizeListener,
) -> EffectCtx<'a> {
    EffectCtx {
        frame,
        rng,
        color_mode,
        resize,
    }
}

/// Runs `effect` until cancelled or a limit in `opts` is hit.
///
/// A frame during which the terminal was resized is not presented; the frame
/// is rebuilt at the new size, the effect prepared again, and the fresh frame
/// presented with no delay.
pub fn run<S: Surface + ?Sized>(
    effect: &mut dyn Effect,
    surface: &mut S,
    rng: &mut StdRng,
    color_mode: ColorMode,
    token: &CancelToken,
    resize: &ResizeListener,
    opts: &DriverOptions,
) -> Result<RunStats> {
    let started = Instant::now();
    let (w, h) = resize.size();
    let mut frame = Frame::new(w, h, opts.background);
    let mut stats = RunStats::default();

    tracing::info!(
        effect = effect.name(),
        width = w,
        height = h,
        mode = color_mode.label(),
        "starting"
    );
    effect.prepare(&mut ctx(&mut frame, rng, color_mode, resize));

    loop {
        if token.is_cancelled() {
            break;
        }
        if opts.duration.is_some_and(|d| started.elapsed() >= d) {
            tracing::debug!("duration reached");
            break;
        }
        if opts.max_frames.is_some_and(|n| stats.frames >= n) {
            tracing::debug!("frame limit reached");
            break;
        }

        let delay = effect.render_frame(&mut ctx(&mut frame, rng, color_mode, resize));
        stats.frames += 1;

        if resize.was_resized() {
            resize.reset();
            let (w, h) = resize.size();
            tracing::info!(width = w, height = h, "terminal resized, preparing again");
            frame = Frame::new(w, h, opts.background);
            effect.prepare(&mut ctx(&mut frame, rng, color_mode, resize));
            stats.resets += 1;
            // the reset frame goes out at once, without the effect's delay
            surface.present(&mut frame)?;
            continue;
        }

        surface.present(&mut frame)?;
        if token.sleep(delay) == Sleep::Cancelled {
            break;
        }
    }

    effect.teardown(&mut ctx(&mut frame, rng, color_mode, resize));
    stats.elapsed = started.elapsed();
    tracing::info!(
        frames = stats.frames,
        resets = stats.resets,
        elapsed_ms = stats.elapsed.as_millis() as u64,
        "stopped"
    );
    Ok(stats)
}
