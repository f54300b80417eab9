//! Terminal Grid
//!
//! A 2D grid of cells representing the visible terminal area. Every accessor
//! is bounds-checked: coordinates come from an untrusted byte stream, so an
//! out-of-range write is a no-op and an out-of-range read is `None`.
//!
//! Row shifting (scrolling, line insertion/deletion) rotates rows in place and
//! then blanks the rows that were rotated in, so no row storage is allocated
//! after construction.

use std::collections::TryReserveError;

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// A row of cells in the terminal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    /// The cells in this row
    pub cells: Vec<Cell>,
}

impl Row {
    /// Allocate a row of `cols` copies of `fill`
    pub fn try_new(cols: usize, fill: Cell) -> Result<Self, TryReserveError> {
        let mut cells = Vec::new();
        cells.try_reserve_exact(cols)?;
        cells.resize(cols, fill);
        Ok(Self { cells })
    }

    pub fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    /// The characters of this row with trailing spaces removed
    pub fn text(&self) -> String {
        let text: String = self.cells.iter().map(|c| c.ch).collect();
        text.trim_end_matches(' ').to_string()
    }
}

/// The terminal grid - a 2D array of cells
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    /// The rows in the grid
    rows: Vec<Row>,
    /// Number of columns
    cols: usize,
}

impl Grid {
    /// Allocate a `rows` x `cols` grid of default cells
    pub fn try_new(cols: usize, rows: usize) -> Result<Self, TryReserveError> {
        let mut grid = Vec::new();
        grid.try_reserve_exact(rows)?;
        for _ in 0..rows {
            grid.push(Row::try_new(cols, Cell::default())?);
        }
        Ok(Self { rows: grid, cols })
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    /// Copy of the cell at (row, col)
    pub fn read(&self, row: usize, col: usize) -> Option<Cell> {
        self.rows.get(row).and_then(|r| r.cells.get(col)).copied()
    }

    /// Set the cell at (row, col)
    pub fn write(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(row).and_then(|r| r.cells.get_mut(col)) {
            *slot = cell;
        }
    }

    /// Get a reference to a row
    pub fn row(&self, row: usize) -> Option<&Row> {
        self.rows.get(row)
    }

    /// Iterate over the rows top to bottom
    pub fn iter_rows(&self) -> impl Iterator<Item = &Row> + '_ {
        self.rows.iter()
    }

    /// Reset the half-open column span `[col_start, col_end)` of one row
    pub fn clear_range(&mut self, row: usize, col_start: usize, col_end: usize, blank: Cell) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        let end = col_end.min(r.cells.len());
        if col_start < end {
            r.cells[col_start..end].fill(blank);
        }
    }

    /// Reset one row
    pub fn clear_row(&mut self, row: usize, blank: Cell) {
        if let Some(r) = self.rows.get_mut(row) {
            r.fill(blank);
        }
    }

    /// Reset every row
    pub fn clear_all(&mut self, blank: Cell) {
        for row in &mut self.rows {
            row.fill(blank);
        }
    }

    /// Clamp an inclusive row region to the grid; `None` if it is empty
    fn region(&self, top: usize, bottom: usize) -> Option<(usize, usize)> {
        let bottom = bottom.min(self.rows.len().checked_sub(1)?);
        (top <= bottom).then_some((top, bottom))
    }

    /// Shift rows `top..=bottom` up by `n`, blanking the `n` rows at the bottom
    pub fn scroll_up(&mut self, n: usize, top: usize, bottom: usize, blank: Cell) {
        let Some((top, bottom)) = self.region(top, bottom) else {
            return;
        };
        let region = &mut self.rows[top..=bottom];
        let n = n.min(region.len());
        if n == 0 {
            return;
        }
        region.rotate_left(n);
        let len = region.len();
        for row in &mut region[len - n..] {
            row.fill(blank);
        }
    }

    /// Shift rows `top..=bottom` down by `n`, blanking the `n` rows at the top
    pub fn scroll_down(&mut self, n: usize, top: usize, bottom: usize, blank: Cell) {
        let Some((top, bottom)) = self.region(top, bottom) else {
            return;
        };
        let region = &mut self.rows[top..=bottom];
        let n = n.min(region.len());
        if n == 0 {
            return;
        }
        region.rotate_right(n);
        for row in &mut region[..n] {
            row.fill(blank);
        }
    }

    /// Insert `n` blank lines at `row`, pushing rows down to `bottom`
    pub fn insert_lines(&mut self, row: usize, n: usize, bottom: usize, blank: Cell) {
        self.scroll_down(n, row, bottom, blank);
    }

    /// Delete `n` lines at `row`, pulling rows up from `bottom`
    pub fn delete_lines(&mut self, row: usize, n: usize, bottom: usize, blank: Cell) {
        self.scroll_up(n, row, bottom, blank);
    }

    /// Insert `n` blank cells at (row, col), shifting the rest of the row right
    pub fn insert_chars(&mut self, row: usize, col: usize, n: usize, blank: Cell) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        let Some(tail) = r.cells.get_mut(col..) else {
            return;
        };
        let n = n.min(tail.len());
        tail.rotate_right(n);
        tail[..n].fill(blank);
    }

    /// Delete `n` cells at (row, col), shifting the rest of the row left
    pub fn delete_chars(&mut self, row: usize, col: usize, n: usize, blank: Cell) {
        let Some(r) = self.rows.get_mut(row) else {
            return;
        };
        let Some(tail) = r.cells.get_mut(col..) else {
            return;
        };
        let n = n.min(tail.len());
        tail.rotate_left(n);
        let len = tail.len();
        tail[len - n..].fill(blank);
    }

    /// A copy of this grid at a new size, keeping the top-left content
    ///
    /// The new storage is allocated whole, so on failure nothing has changed.
    pub fn resized(&self, cols: usize, rows: usize) -> Result<Self, TryReserveError> {
        let mut grid = Self::try_new(cols, rows)?;
        for (dst, src) in grid.rows.iter_mut().zip(&self.rows) {
            let n = cols.min(src.cells.len());
            dst.cells[..n].copy_from_slice(&src.cells[..n]);
        }
        Ok(grid)
    }
}
