// Copyright (c) 2026 rezky_nightky

use crossterm::style::Color;

use crate::cell::Cell;

/// Cell grid with change tracking. Only cells whose content actually changed
/// are reported dirty.
#[derive(Clone, Debug)]
pub struct Frame {
    pub width: u16,
    pub height: u16,
    cells: Vec<Cell>,
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
            blank,
            dirty_all: true,
            dirty_map: vec![false; len],
            dirty: Vec::new(),
        }
    }

    pub fn blank(&self) -> Cell {
        self.blank
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
            self.dirty_all = false;
            self.dirty_map.fill(false);
        } else {
            for &i in &self.dirty {
                self.dirty_map[i] = false;
            }
        }
        self.dirty.clear();
    }

    pub fn index(&self, x: u16, y: u16) -> Option<usize> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }

    #[allow(dead_code)]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        self.index(x, y).map(|i| &self.cells[i])
    }

    pub fn cell_at_index(&self, i: usize) -> Cell {
        self.cells.get(i).copied().unwrap_or(self.blank)
    }

    pub fn set(&mut self, x: u16, y: u16, cell: Cell) {
        if let Some(i) = self.index(x, y) {
            self.set_index(i, cell);
        }
    }

    pub fn set_index(&mut self, i: usize, cell: Cell) {
        let Some(cur) = self.cells.get_mut(i) else {
            return;
        };
        if *cur == cell {
            return;
        }
        *cur = cell;
        if !self.dirty_all && !self.dirty_map[i] {
            self.dirty_map[i] = true;
            self.dirty.push(i);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn star() -> Cell {
        Cell::glyph('*', None, None, false)
    }

    #[test]
    fn new_frame_starts_fully_dirty() {
        let mut f = Frame::new(3, 2, None);
        assert!(f.is_dirty_all());
        f.clear_dirty();
        assert!(!f.has_changes());
    }

    #[test]
    fn only_real_changes_are_dirty() {
        let mut f = Frame::new(4, 4, None);
        f.clear_dirty();

        f.set(1, 2, star());
        f.set(1, 2, star());
        assert_eq!(f.dirty_indices(), &[9]);
        assert_eq!(f.get(1, 2).unwrap().ch, '*');

        f.clear_dirty();
        f.set(1, 2, star());
        assert!(!f.has_changes());

        f.set(9, 9, star());
        assert!(!f.has_changes());
    }
}
