// Copyright (c) 2026 rezky_nightky

use std::io::{stdout, Result, Stdout, Write};

use crossterm::{
    cursor,
    style::{
        Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
    },
    terminal, ExecutableCommand, QueueableCommand,
};

use crate::cell::Cell;
use crate::driver::Surface;
use crate::frame::Frame;

/// What the terminal currently shows, used to skip cells that did not change.
struct Shown {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Shown {
    fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::blank(None); width as usize * height as usize],
        }
    }

    fn fits(&self, frame: &Frame) -> bool {
        self.width == frame.width && self.height == frame.height
    }
}

/// Pen state tracked while queueing output so redundant style commands are skipped.
#[derive(Default)]
struct Pen {
    fg: Option<Color>,
    bg: Option<Color>,
    bold: bool,
    pos: Option<(u16, u16)>,
}

impl Pen {
    fn style(&mut self, out: &mut Stdout, cell: &Cell) -> Result<()> {
        if cell.fg != self.fg {
            out.queue(SetForegroundColor(cell.fg.unwrap_or(Color::Reset)))?;
            self.fg = cell.fg;
        }
        if cell.bg != self.bg {
            out.queue(SetBackgroundColor(cell.bg.unwrap_or(Color::Reset)))?;
            self.bg = cell.bg;
        }
        if cell.bold != self.bold {
            out.queue(SetAttribute(if cell.bold {
                Attribute::Bold
            } else {
                Attribute::NormalIntensity
            }))?;
            self.bold = cell.bold;
        }
        Ok(())
    }

    fn move_to(&mut self, out: &mut Stdout, x: u16, y: u16) -> Result<()> {
        if self.pos != Some((x, y)) {
            out.queue(cursor::MoveTo(x, y))?;
        }
        Ok(())
    }
}

pub struct Terminal {
    stdout: Stdout,
    shown: Option<Shown>,
    run_buf: String,
    rows: Vec<Vec<usize>>,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        let mut out = stdout();
        terminal::enable_raw_mode()?;
        let init: Result<()> = (|| {
            out.execute(terminal::EnterAlternateScreen)?;
            out.execute(cursor::Hide)?;
            let _ = out.execute(terminal::DisableLineWrap);
            out.execute(SetAttribute(Attribute::Reset))?;
            out.execute(ResetColor)?;
            out.execute(terminal::Clear(terminal::ClearType::All))?;
            out.flush()
        })();
        if let Err(e) = init {
            restore_terminal_best_effort();
            return Err(e);
        }
        Ok(Self {
            stdout: out,
            shown: None,
            run_buf: String::with_capacity(64),
            rows: Vec::new(),
        })
    }

    pub fn size() -> Result<(u16, u16)> {
        terminal::size()
    }

    fn finish(&mut self, frame: &mut Frame) -> Result<()> {
        self.stdout.queue(SetAttribute(Attribute::Reset))?;
        self.stdout.queue(ResetColor)?;
        self.stdout.flush()?;
        frame.clear_dirty();
        Ok(())
    }

    fn draw_full(&mut self, frame: &mut Frame) -> Result<()> {
        let resized = !self.shown.as_ref().is_some_and(|s| s.fits(frame));
        if resized {
            self.stdout
                .queue(terminal::Clear(terminal::ClearType::All))?;
            self.shown = Some(Shown::new(frame.width, frame.height));
        }
        let Some(shown) = self.shown.as_mut() else {
            return Ok(());
        };

        let mut pen = Pen::default();
        for y in 0..frame.height {
            self.stdout.queue(cursor::MoveTo(0, y))?;
            for x in 0..frame.width {
                let idx = y as usize * frame.width as usize + x as usize;
                let cell = frame.cell_at_index(idx);
                pen.style(&mut self.stdout, &cell)?;
                self.stdout.queue(Print(cell.ch))?;
                shown.cells[idx] = cell;
            }
        }
        self.finish(frame)
    }

    /// Emits only the dirty cells, merging horizontal runs that share a style.
    fn draw_dirty(&mut self, frame: &mut Frame) -> Result<()> {
        let Some(shown) = self.shown.as_mut() else {
            return Ok(());
        };
        let width = frame.width as usize;

        if self.rows.len() != frame.height as usize {
            self.rows = vec![Vec::new(); frame.height as usize];
        }
        for &idx in frame.dirty_indices() {
            if let Some(row) = self.rows.get_mut(idx / width) {
                row.push(idx);
            }
        }

        let mut pen = Pen::default();
        for (y, row) in self.rows.iter_mut().enumerate() {
            if row.is_empty() {
                continue;
            }
            row.sort_unstable();

            let mut i = 0usize;
            while i < row.len() {
                let start = row[i];
                let first = frame.cell_at_index(start);
                if shown.cells[start] == first {
                    i += 1;
                    continue;
                }
                shown.cells[start] = first;

                self.run_buf.clear();
                self.run_buf.push(first.ch);
                let mut end = start;
                let mut j = i + 1;
                while j < row.len() && row[j] == end + 1 {
                    let next = frame.cell_at_index(row[j]);
                    let same_style =
                        next.fg == first.fg && next.bg == first.bg && next.bold == first.bold;
                    if shown.cells[row[j]] == next || !same_style {
                        break;
                    }
                    shown.cells[row[j]] = next;
                    self.run_buf.push(next.ch);
                    end = row[j];
                    j += 1;
                }

                let x0 = (start % width) as u16;
                let y0 = y as u16;
                pen.move_to(&mut self.stdout, x0, y0)?;
                pen.style(&mut self.stdout, &first)?;
                self.stdout.queue(Print(self.run_buf.as_str()))?;
                let next_x = (end % width) as u16 + 1;
                pen.pos = (next_x < frame.width).then_some((next_x, y0));

                i = j;
            }
            row.clear();
        }

        self.finish(frame)
    }
}

impl Surface for Terminal {
    fn present(&mut self, frame: &mut Frame) -> Result<()> {
        if !frame.has_changes() && self.shown.as_ref().is_some_and(|s| s.fits(frame)) {
            return Ok(());
        }
        let total = frame.width as usize * frame.height as usize;
        let fits = self.shown.as_ref().is_some_and(|s| s.fits(frame));
        let large = total > 0 && frame.dirty_indices().len() >= total / 3;
        if !fits || frame.is_dirty_all() || large {
            self.draw_full(frame)
        } else {
            self.draw_dirty(frame)
        }
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        restore_terminal_best_effort();
    }
}

pub fn restore_terminal_best_effort() {
    let mut out = stdout();
    let _ = out.execute(SetAttribute(Attribute::Reset));
    let _ = out.execute(ResetColor);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::EnableLineWrap);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();
    let _ = out.flush();
}
