// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;

/// Off-screen cell grid with dirty tracking.
///
/// Clearing bumps a generation counter instead of touching every cell: a cell
/// whose generation is stale reads as the current blank.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
    gen: u32,
    cell_gen: Vec<u32>,
    blank: Cell,
    dirty_all: bool,
    dirty_map: Vec<bool>,
    dirty: Vec<usize>,
}

impl Frame {
    pub fn new(width: u16, height: u16, bg: Option<Color>) -> Self {
        let len = width as usize * height as usize;
        let blank = Cell::blank(bg);
        Self {
            width,
            height,
            cells: vec![blank; len],
            gen: 1,
            cell_gen: vec![1; len],
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn background(&self) -> Option<Color> {
        self.blank.bg
    }

    pub fn clear(&mut self) {
        self.gen = self.gen.wrapping_add(1);
        if self.gen == 0 {
            self.cell_gen.fill(0);
            self.gen = 1;
        }
        self.dirty_all = true;
        self.dirty.clear();
    }

    pub fn is_dirty_all(&self) -> bool {
        self.dirty_all
    }

    pub fn dirty_indices(&self) -> &[usize] {
        &self.dirty
    }

    pub fn has_changes(&self) -> bool {
        self.dirty_all || !self.dirty.is_empty()
    }

    pub fn clear_dirty(&mut self) {
        if self.dirty_all {
            self.dirty_map.fill(false);
        } else {
            for &i in &self.dirty {
                if let Some(v) = self.dirty_map.get_mut(i) {
                    *v = false;
                }
            }
        }
        self.dirty_all = false;
        self.dirty.clear();
    }

    fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        if self.cell_gen.get(i).copied() == Some(self.gen) {
            self.cells[i]
        } else {
            self.blank
        }
    }

    #[cfg(test)]
    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        self.index(x, y).map(|i| self.cell_at_index(i))
    }

    /// Writes a cell. Out-of-bounds writes are dropped.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        let Some(i) = self.index(x, y) else {
            return;
        };
        if self.cell_at_index(i) == cell {
            return;
        }
        self.cells[i] = cell;
        self.cell_gen[i] = self.gen;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn x_cell() -> Cell {
        Cell::glyph('x', None, None)
    }

    #[test]
    fn clear_makes_cells_read_as_blank() {
        let mut f = Frame::new(2, 2, None);
        f.set(0, 0, x_cell());
        assert_eq!(f.get(0, 0).unwrap().ch, 'x');
        f.clear();
        assert_eq!(f.get(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn writes_are_tracked_once_and_out_of_bounds_ignored() {
        let mut f = Frame::new(3, 2, None);
        f.clear_dirty();
        f.set(1, 1, x_cell());
        f.set(1, 1, Cell::glyph('y', None, None));
        f.set(3, 0, x_cell());
        f.set(0, 2, x_cell());
        assert_eq!(f.dirty_indices(), &[4]);
        f.clear_dirty();
        assert!(!f.has_changes());
    }

    #[test]
    fn unchanged_write_is_not_dirty() {
        let mut f = Frame::new(2, 1, None);
        f.clear_dirty();
        f.set(0, 0, Cell::blank(None));
        assert!(!f.has_changes());
    }
}
