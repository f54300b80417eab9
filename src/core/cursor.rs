//! Cursor state management
//!
//! The cursor tracks position and the pen (attributes applied to the next
//! written cell). It also supports save/restore operations (DECSC/DECRC and
//! CSI s/u).

use serde::{Deserialize, Serialize};

use super::{Cell, Color, Style};

/// Attributes applied to the next written cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pen {
    pub fg: Color,
    pub bg: Color,
    pub style: Style,
}

impl Pen {
    /// Reset to default attributes (SGR 0)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Build a cell holding `ch` drawn with this pen
    pub fn cell(&self, ch: char) -> Cell {
        Cell::with_style(ch, self.fg, self.bg, self.style)
    }
}

/// Cursor state including position and pen
///
/// The column is always a valid cell index; printing into the last column
/// wraps immediately.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    /// Column position (0-indexed)
    pub col: usize,
    /// Row position (0-indexed)
    pub row: usize,
    /// Current text attributes
    pub pen: Pen,
}

/// Saved cursor state for DECSC/DECRC
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedCursor {
    pub col: usize,
    pub row: usize,
    pub pen: Pen,
}

impl Cursor {
    /// Create a new cursor at the home position
    pub fn new() -> Self {
        Self::default()
    }

    /// Move cursor to absolute position, clamping to bounds
    pub fn move_to(&mut self, row: usize, col: usize, rows: usize, cols: usize) {
        self.row = row.min(rows.saturating_sub(1));
        self.col = col.min(cols.saturating_sub(1));
    }

    /// Move cursor up by n rows, stopping at the top margin when the cursor
    /// starts inside the scroll region and at row 0 otherwise
    pub fn move_up(&mut self, n: usize, top: usize) {
        let limit = if self.row >= top { top } else { 0 };
        self.row = self.row.saturating_sub(n).max(limit);
    }

    /// Move cursor down by n rows, stopping at the bottom margin when the
    /// cursor starts inside the scroll region and at the last row otherwise
    pub fn move_down(&mut self, n: usize, bottom: usize, rows: usize) {
        let limit = if self.row <= bottom {
            bottom
        } else {
            rows.saturating_sub(1)
        };
        self.row = self.row.saturating_add(n).min(limit);
    }

    /// Move cursor left by n columns, stopping at column 0
    pub fn move_left(&mut self, n: usize) {
        self.col = self.col.saturating_sub(n);
    }

    /// Move cursor right by n columns, stopping at the last column
    pub fn move_right(&mut self, n: usize, cols: usize) {
        self.col = self.col.saturating_add(n).min(cols.saturating_sub(1));
    }

    /// Carriage return - move to column 0
    pub fn carriage_return(&mut self) {
        self.col = 0;
    }

    /// Save cursor state
    pub fn save(&self) -> SavedCursor {
        SavedCursor {
            col: self.col,
            row: self.row,
            pen: self.pen,
        }
    }

    /// Restore cursor state, clamping the position to the grid
    pub fn restore(&mut self, saved: &SavedCursor, rows: usize, cols: usize) {
        self.move_to(saved.row, saved.col, rows, cols);
        self.pen = saved.pen;
    }

    /// Reset cursor to default state
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
