// Copyright (c) 2026 rezky_nightky

//! Falling/fading particles used by the bleed effects.
//!
//! A particle owns one column while alive. It falls one row per tick, then
//! fades every cell it covered toward black, then dies and frees its column.

use std::collections::BTreeSet;

use rand::Rng;

use crate::cell::Cell;
use crate::color::Rgb;
use crate::frame::Frame;
use crate::runtime::ColorMode;

/// True with probability `pct` percent.
pub fn percent_chance<R: Rng>(rng: &mut R, pct: u32) -> bool {
    rng.random_range(0..100u32) < pct
}

/// Columns held by live particles. At most one particle per column.
#[derive(Clone, Debug, Default)]
pub struct ColumnReservations {
    cols: BTreeSet<u16>,
}

impl ColumnReservations {
    /// Returns false when the column was already taken.
    pub fn reserve(&mut self, col: u16) -> bool {
        self.cols.insert(col)
    }

    pub fn release(&mut self, col: u16) -> bool {
        self.cols.remove(&col)
    }

    pub fn clear(&mut self) {
        self.cols.clear();
    }

    fn count_below(&self, width: u16) -> usize {
        self.cols.range(..width).count()
    }
}

#[cfg(test)]
impl ColumnReservations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_reserved(&self, col: u16) -> bool {
        self.cols.contains(&col)
    }

    pub fn len(&self) -> usize {
        self.cols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cols.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParticleState {
    Falling,
    Fading,
    Done,
}

/// How a particle shows up on screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaintStyle {
    /// A space painted with the particle color as background.
    Block,
    /// A glyph painted with the particle color as foreground.
    Glyph,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Covered {
    pub row: u16,
    pub col: u16,
    pub glyph: Option<char>,
}

#[derive(Clone, Debug)]
pub struct Particle {
    column: u16,
    fall_step: u32,
    fade_step: u32,
    state: ParticleState,
    color: Rgb,
    covered: Vec<Covered>,
}

impl Particle {
    /// Claims a free column chosen uniformly at random.
    ///
    /// Returns `None` when every column in `0..width` is already reserved.
    pub fn spawn<R: Rng>(
        rng: &mut R,
        width: u16,
        reserved: &mut ColumnReservations,
        color: Rgb,
    ) -> Option<Particle> {
        Self::spawn_with(|| rng.random_range(0..width), width, reserved, color)
    }

    /// Like `spawn` with the column picker supplied by the caller. Picks that
    /// are reserved or outside `0..width` are retried.
    pub fn spawn_with(
        mut pick: impl FnMut() -> u16,
        width: u16,
        reserved: &mut ColumnReservations,
        color: Rgb,
    ) -> Option<Particle> {
        if width == 0 || reserved.count_below(width) >= width as usize {
            return None;
        }
        let column = loop {
            let col = pick();
            if col < width && reserved.reserve(col) {
                break col;
            }
        };
        Some(Particle {
            column,
            fall_step: 0,
            fade_step: 0,
            state: ParticleState::Falling,
            color,
            covered: Vec::new(),
        })
    }

    /// Runs one tick of the state machine.
    ///
    /// The last fade step paints the covered cells solid black, and they stay
    /// that way until something draws over them.
    ///
    /// `glyph` is only used by `PaintStyle::Glyph` while falling.
    pub fn advance(
        &mut self,
        frame: &mut Frame,
        style: PaintStyle,
        mode: ColorMode,
        height: u16,
        max_fade_steps: u32,
        glyph: Option<char>,
    ) {
        match self.state {
            ParticleState::Falling => {
                if self.fall_step < height as u32 {
                    let glyph = match style {
                        PaintStyle::Block => None,
                        PaintStyle::Glyph => Some(glyph.unwrap_or('0')),
                    };
                    let spot = Covered {
                        row: self.fall_step as u16,
                        col: self.column,
                        glyph,
                    };
                    paint(frame, style, mode, spot, self.color);
                    self.covered.push(spot);
                }
                self.fall_step += 1;
                if self.fall_step > height.saturating_sub(1) as u32 {
                    self.state = ParticleState::Fading;
                }
            }
            ParticleState::Fading => {
                let faded = self.color.faded(max_fade_steps, self.fade_step);
                for &spot in &self.covered {
                    paint(frame, style, mode, spot, faded);
                }
                self.fade_step += 1;
                if self.fade_step > max_fade_steps {
                    self.state = ParticleState::Done;
                }
            }
            ParticleState::Done => {}
        }
    }
}

#[cfg(test)]
impl Particle {
    pub fn column(&self) -> u16 {
        self.column
    }

    pub fn state(&self) -> ParticleState {
        self.state
    }

    pub fn fall_step(&self) -> u32 {
        self.fall_step
    }

    pub fn fade_step(&self) -> u32 {
        self.fade_step
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn covered(&self) -> &[Covered] {
        &self.covered
    }
}

fn paint(frame: &mut Frame, style: PaintStyle, mode: ColorMode, spot: Covered, color: Rgb) {
    let cell = match style {
        PaintStyle::Block => Cell::blank(mode.render(color)),
        PaintStyle::Glyph => Cell::glyph(
            spot.glyph.unwrap_or(' '),
            mode.render(color),
            frame.background(),
        ),
    };
    frame.set(spot.col, spot.row, cell);
}

/// Where new particles get their color and falling glyphs.
pub trait ParticleSource {
    fn color<R: Rng>(&mut self, rng: &mut R) -> Rgb;

    fn glyph<R: Rng>(&mut self, _rng: &mut R) -> Option<char> {
        None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldParams {
    pub drop_chance: u32,
    pub max_fade_steps: u32,
    pub style: PaintStyle,
}

/// The live particles of one effect instance and their column reservations.
#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    particles: Vec<Particle>,
    reserved: ColumnReservations,
}

impl ParticleField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.reserved.clear();
    }

    /// One animation tick: maybe spawn, advance everything, sweep the dead.
    ///
    /// A resized tick does nothing at all; the owning effect resets the
    /// field when it prepares for the new size.
    pub fn tick<R: Rng, S: ParticleSource>(
        &mut self,
        rng: &mut R,
        frame: &mut Frame,
        mode: ColorMode,
        params: &FieldParams,
        source: &mut S,
        resized: bool,
    ) {
        if resized {
            tracing::trace!(live = self.particles.len(), "resized, skipping particle tick");
            return;
        }

        if percent_chance(rng, params.drop_chance) {
            let color = source.color(rng);
            if let Some(p) = Particle::spawn(rng, frame.width, &mut self.reserved, color) {
                tracing::trace!(column = p.column, "particle spawned");
                self.particles.push(p);
            }
        }

        let height = frame.height;
        for p in &mut self.particles {
            let glyph = match (params.style, p.state) {
                (PaintStyle::Glyph, ParticleState::Falling) => source.glyph(rng),
                _ => None,
            };
            p.advance(frame, params.style, mode, height, params.max_fade_steps, glyph);
        }

        let reserved = &mut self.reserved;
        self.particles.retain(|p| {
            if p.state == ParticleState::Done {
                reserved.release(p.column);
                false
            } else {
                true
            }
        });
    }
}

#[cfg(test)]
impl ParticleField {
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn reserved(&self) -> &ColumnReservations {
        &self.reserved
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn spawn_with(&mut self, pick: impl FnMut() -> u16, width: u16, color: Rgb) -> bool {
        match Particle::spawn_with(pick, width, &mut self.reserved, color) {
            Some(p) => {
                self.particles.push(p);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::style::Color;
    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    struct Fixed(Rgb);

    impl ParticleSource for Fixed {
        fn color<R: Rng>(&mut self, _rng: &mut R) -> Rgb {
            self.0
        }

        fn glyph<R: Rng>(&mut self, _rng: &mut R) -> Option<char> {
            Some('#')
        }
    }

    fn picks(cols: &[u16]) -> impl FnMut() -> u16 + '_ {
        let mut it = cols.iter().copied();
        move || it.next().expect("picker exhausted")
    }

    fn spawn_at(col: u16, width: u16, reserved: &mut ColumnReservations, color: Rgb) -> Particle {
        Particle::spawn_with(picks(&[col]), width, reserved, color).unwrap()
    }

    fn bg_rgb(c: Rgb) -> Option<Color> {
        ColorMode::TrueColor.render(c)
    }

    #[test]
    fn falls_then_fades_exactly_on_the_thresholds() {
        let mut frame = Frame::new(10, 5, None);
        let mut reserved = ColumnReservations::new();
        let mut p = spawn_at(2, 10, &mut reserved, Rgb::new(200, 0, 0));
        let tick = |p: &mut Particle, f: &mut Frame| {
            p.advance(f, PaintStyle::Block, ColorMode::TrueColor, 5, 3, None)
        };

        for expected_step in 1..=4 {
            tick(&mut p, &mut frame);
            assert_eq!(p.state(), ParticleState::Falling);
            assert_eq!(p.fall_step(), expected_step);
        }
        tick(&mut p, &mut frame);
        assert_eq!(p.fall_step(), 5);
        assert_eq!(p.state(), ParticleState::Fading);
        assert_eq!(p.covered().len(), 5);

        for _ in 0..3 {
            tick(&mut p, &mut frame);
            assert_eq!(p.state(), ParticleState::Fading);
        }
        assert_eq!(p.fade_step(), 3);
        tick(&mut p, &mut frame);
        assert_eq!(p.fade_step(), 4);
        assert_eq!(p.state(), ParticleState::Done);
    }

    #[test]
    fn green_particle_in_column_five_fades_to_black() {
        let green = Rgb::new(0, 255, 0);
        let mut frame = Frame::new(10, 3, None);
        let mut reserved = ColumnReservations::new();
        let mut p = spawn_at(5, 10, &mut reserved, green);

        for _ in 0..3 {
            p.advance(&mut frame, PaintStyle::Block, ColorMode::TrueColor, 3, 25, None);
        }
        assert_eq!(p.state(), ParticleState::Fading);
        assert_eq!(frame.get(5, 2).unwrap().bg, bg_rgb(green));

        for _ in 0..=25 {
            p.advance(&mut frame, PaintStyle::Block, ColorMode::TrueColor, 3, 25, None);
        }
        assert_eq!(p.state(), ParticleState::Done);
        assert_eq!(green.faded(25, 25), Rgb::BLACK);
        for row in 0..3 {
            assert_eq!(frame.get(5, row).unwrap().bg, bg_rgb(Rgb::BLACK));
        }
    }

    #[test]
    fn reserved_column_is_retried_until_a_free_one_comes_up() {
        let mut field = ParticleField::new();
        assert!(field.spawn_with(picks(&[3]), 10, Rgb::BLACK));

        let seq = [3, 3, 7];
        let mut used = 0;
        let mut it = seq.iter().copied();
        assert!(field.spawn_with(
            || {
                used += 1;
                it.next().unwrap()
            },
            10,
            Rgb::BLACK,
        ));
        assert_eq!(used, 3);
        assert_eq!(field.particles()[1].column(), 7);
        assert_eq!(field.reserved().len(), field.len());
        assert!(field.reserved().is_reserved(3));
        assert!(field.reserved().is_reserved(7));
    }

    #[test]
    fn out_of_range_picks_are_retried() {
        let mut reserved = ColumnReservations::new();
        let p = Particle::spawn_with(picks(&[12, 40, 1]), 4, &mut reserved, Rgb::BLACK).unwrap();
        assert_eq!(p.column(), 1);
    }

    #[test]
    fn full_width_refuses_to_spawn() {
        let mut reserved = ColumnReservations::new();
        for c in 0..3 {
            reserved.reserve(c);
        }
        let mut rng = StdRng::seed_from_u64(1);
        assert!(Particle::spawn(&mut rng, 3, &mut reserved, Rgb::BLACK).is_none());
        assert!(Particle::spawn(&mut rng, 0, &mut ColumnReservations::new(), Rgb::BLACK).is_none());
    }

    #[test]
    fn resized_tick_leaves_everything_untouched() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut frame = Frame::new(8, 6, None);
        let mut field = ParticleField::new();
        let params = FieldParams {
            drop_chance: 100,
            max_fade_steps: 4,
            style: PaintStyle::Block,
        };
        let mut src = Fixed(Rgb::new(0, 0, 255));

        field.tick(&mut rng, &mut frame, ColorMode::TrueColor, &params, &mut src, false);
        field.tick(&mut rng, &mut frame, ColorMode::TrueColor, &params, &mut src, false);
        let before: Vec<Vec<Covered>> =
            field.particles().iter().map(|p| p.covered().to_vec()).collect();
        let live = field.len();
        frame.clear_dirty();

        field.tick(&mut rng, &mut frame, ColorMode::TrueColor, &params, &mut src, true);

        let after: Vec<Vec<Covered>> =
            field.particles().iter().map(|p| p.covered().to_vec()).collect();
        assert_eq!(field.len(), live);
        assert_eq!(before, after);
        assert!(!frame.has_changes());

        field.clear();
        assert!(field.is_empty());
        assert!(field.reserved().is_empty());
    }

    #[test]
    fn glyph_particles_repaint_their_glyphs_while_fading() {
        let mut frame = Frame::new(4, 2, None);
        let mut reserved = ColumnReservations::new();
        let mut p = spawn_at(1, 4, &mut reserved, Rgb::new(0, 200, 0));
        p.advance(&mut frame, PaintStyle::Glyph, ColorMode::TrueColor, 2, 2, Some('a'));
        p.advance(&mut frame, PaintStyle::Glyph, ColorMode::TrueColor, 2, 2, Some('b'));
        assert_eq!(p.state(), ParticleState::Fading);

        p.advance(&mut frame, PaintStyle::Glyph, ColorMode::TrueColor, 2, 2, None);
        p.advance(&mut frame, PaintStyle::Glyph, ColorMode::TrueColor, 2, 2, None);
        let top = frame.get(1, 0).unwrap();
        let bottom = frame.get(1, 1).unwrap();
        assert_eq!(top.ch, 'a');
        assert_eq!(bottom.ch, 'b');
        assert_eq!(top.fg, bg_rgb(Rgb::new(0, 100, 0)));
    }

    #[test]
    fn dead_particles_release_their_columns() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut frame = Frame::new(1, 2, None);
        let mut field = ParticleField::new();
        let params = FieldParams {
            drop_chance: 100,
            max_fade_steps: 1,
            style: PaintStyle::Block,
        };
        let mut src = Fixed(Rgb::new(9, 9, 9));

        field.tick(&mut rng, &mut frame, ColorMode::TrueColor, &params, &mut src, false);
        assert_eq!(field.len(), 1);
        assert!(field.reserved().is_reserved(0));

        // falling row 1, then fade step 0
        for _ in 0..2 {
            field.tick(&mut rng, &mut frame, ColorMode::TrueColor, &params, &mut src, false);
            assert_eq!(field.len(), 1);
        }
        // fade step 1 is the last; the only column stays taken until the sweep
        field.tick(&mut rng, &mut frame, ColorMode::TrueColor, &params, &mut src, false);
        assert!(field.is_empty());
        assert!(field.reserved().is_empty());
    }

    proptest! {
        #[test]
        fn reservations_always_match_live_particles(
            seed in any::<u64>(),
            width in 1u16..12,
            height in 1u16..12,
            chance in 0u32..=100,
            fade in 1u32..8,
            ticks in 1usize..120,
        ) {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut frame = Frame::new(width, height, None);
            let mut field = ParticleField::new();
            let params = FieldParams { drop_chance: chance, max_fade_steps: fade, style: PaintStyle::Glyph };
            let mut src = Fixed(Rgb::new(0, 255, 0));

            for _ in 0..ticks {
                field.tick(&mut rng, &mut frame, ColorMode::Color256, &params, &mut src, false);

                let mut cols: Vec<u16> = field.particles().iter().map(|p| p.column()).collect();
                let n = cols.len();
                cols.sort_unstable();
                cols.dedup();
                prop_assert_eq!(cols.len(), n);
                prop_assert_eq!(field.reserved().len(), n);
                for c in cols {
                    prop_assert!(c < width);
                    prop_assert!(field.reserved().is_reserved(c));
                }
                for p in field.particles() {
                    prop_assert!(p.state() != ParticleState::Done);
                }
            }
        }
    }
}
