// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;
use rand::Rng;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn channels(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    fn from_channels(c: [u8; 3]) -> Self {
        Self::new(c[0], c[1], c[2])
    }

    /// The color `step` steps into a linear fade toward black over `max_steps`.
    pub fn faded(self, max_steps: u32, step: u32) -> Rgb {
        Rgb::new(
            fade_component(self.r, max_steps, step),
            fade_component(self.g, max_steps, step),
            fade_component(self.b, max_steps, step),
        )
    }
}

/// `round(orig - (orig / max_steps) * step)`, kept within `[0, orig]`.
pub fn fade_component(orig: u8, max_steps: u32, step: u32) -> u8 {
    let orig = orig as f64;
    let per_step = orig / max_steps.max(1) as f64;
    (orig - per_step * step as f64).round().clamp(0.0, orig) as u8
}

fn dist2(a: Rgb, b: Rgb) -> i32 {
    let dr = a.r as i32 - b.r as i32;
    let dg = a.g as i32 - b.g as i32;
    let db = a.b as i32 - b.b as i32;
    dr * dr + dg * dg + db * db
}

const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

const SYSTEM_COLORS: [(Color, Rgb); 16] = [
    (Color::Black, Rgb::new(0, 0, 0)),
    (Color::DarkRed, Rgb::new(128, 0, 0)),
    (Color::DarkGreen, Rgb::new(0, 128, 0)),
    (Color::DarkYellow, Rgb::new(128, 128, 0)),
    (Color::DarkBlue, Rgb::new(0, 0, 128)),
    (Color::DarkMagenta, Rgb::new(128, 0, 128)),
    (Color::DarkCyan, Rgb::new(0, 128, 128)),
    (Color::Grey, Rgb::new(192, 192, 192)),
    (Color::DarkGrey, Rgb::new(128, 128, 128)),
    (Color::Red, Rgb::new(255, 0, 0)),
    (Color::Green, Rgb::new(0, 255, 0)),
    (Color::Yellow, Rgb::new(255, 255, 0)),
    (Color::Blue, Rgb::new(0, 0, 255)),
    (Color::Magenta, Rgb::new(255, 0, 255)),
    (Color::Cyan, Rgb::new(0, 255, 255)),
    (Color::White, Rgb::new(255, 255, 255)),
];

/// Nearest xterm-256 index, choosing between the 6x6x6 cube and the gray ramp.
pub fn rgb_to_ansi256(c: Rgb) -> u8 {
    let level = |v: u8| ((v as u16 * 5 + 127) / 255) as u8;
    let (r6, g6, b6) = (level(c.r), level(c.g), level(c.b));
    let cube = Rgb::new(
        CUBE_LEVELS[r6 as usize],
        CUBE_LEVELS[g6 as usize],
        CUBE_LEVELS[b6 as usize],
    );
    let cube_idx = 16 + 36 * r6 + 6 * g6 + b6;

    let avg = ((c.r as u16 + c.g as u16 + c.b as u16) / 3) as u8;
    let gray_idx = match avg {
        0..=7 => 16,
        239..=255 => 231,
        v => 232 + (v - 8) / 10,
    };

    if dist2(c, ansi256_to_rgb(gray_idx)) < dist2(c, cube) {
        gray_idx
    } else {
        cube_idx
    }
}

/// RGB value of an xterm-256 palette entry.
pub fn ansi256_to_rgb(idx: u8) -> Rgb {
    match idx {
        0..=15 => SYSTEM_COLORS[idx as usize].1,
        16..=231 => {
            let i = idx - 16;
            Rgb::new(
                CUBE_LEVELS[(i / 36) as usize],
                CUBE_LEVELS[((i / 6) % 6) as usize],
                CUBE_LEVELS[(i % 6) as usize],
            )
        }
        _ => {
            let v = 8 + 10 * (idx - 232);
            Rgb::new(v, v, v)
        }
    }
}

pub fn rgb_to_color16(c: Rgb) -> Color {
    SYSTEM_COLORS
        .iter()
        .min_by_key(|(_, rgb)| dist2(c, *rgb))
        .map(|(color, _)| *color)
        .unwrap_or(Color::White)
}

/// Inclusive per-channel bounds. Callers guarantee `min <= max` per channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelBounds {
    pub min: Rgb,
    pub max: Rgb,
}

impl ChannelBounds {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Rgb {
        let lo = self.min.channels();
        let hi = self.max.channels();
        Rgb::from_channels(std::array::from_fn(|i| {
            rng.random_range(lo[i]..=hi[i].max(lo[i]))
        }))
    }
}

/// Inclusive range of xterm-256 palette indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LevelBounds {
    pub min: u8,
    pub max: u8,
}

impl LevelBounds {
    pub fn sample<R: Rng>(&self, rng: &mut R) -> Rgb {
        ansi256_to_rgb(rng.random_range(self.min..=self.max.max(self.min)))
    }
}

/// Walks from one color to another in `frames` equal steps.
///
/// The step is `(from - to) / frames` per channel and is subtracted every
/// frame. Intermediate values are clamped to `[0, 255]`.
#[derive(Clone, Debug)]
pub struct ColorStepper {
    current: [f64; 3],
    step: [f64; 3],
    target: Rgb,
    remaining: u32,
}

impl ColorStepper {
    pub fn new(from: Rgb, to: Rgb, frames: u32) -> Self {
        let frames = frames.max(1);
        let f = from.channels();
        let t = to.channels();
        let step = std::array::from_fn(|i| (f[i] as f64 - t[i] as f64) / frames as f64);
        Self {
            current: f.map(|v| v as f64),
            step,
            target: to,
            remaining: frames,
        }
    }

    pub fn current(&self) -> Rgb {
        Rgb::from_channels(self.current.map(|v| v.round().clamp(0.0, 255.0) as u8))
    }

    #[cfg(test)]
    pub fn is_done(&self) -> bool {
        self.remaining == 0
    }

    /// Moves one step and returns the new color.
    pub fn advance(&mut self) -> Rgb {
        if self.remaining == 0 {
            return self.current();
        }
        self.remaining -= 1;
        if self.remaining == 0 {
            self.current = self.target.channels().map(|v| v as f64);
        } else {
            for (v, step) in self.current.iter_mut().zip(self.step) {
                *v = (*v - step).clamp(0.0, 255.0);
            }
        }
        self.current()
    }
}
