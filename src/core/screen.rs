//! Screen model implementation
//!
//! A screen is one cell grid plus the cursor, pen, saved cursor and scroll
//! region that belong to it. The terminal owns two of them (primary and
//! alternate) and routes every operation to the active one.
//!
//! All cursor arithmetic clamps to the grid, so the cursor is always inside it
//! after any operation.

use std::collections::TryReserveError;

use serde::{Deserialize, Serialize};

use super::cell::Cell;
use super::cursor::{Cursor, Pen, SavedCursor};
use super::grid::{Grid, Row};

/// Erase mode for ED/EL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EraseMode {
    /// From the cursor to the end (inclusive)
    ToEnd,
    /// From the start to the cursor (inclusive)
    ToStart,
    /// Everything
    All,
}

impl EraseMode {
    /// Map an ED/EL parameter; mode 3 (scrollback) erases like 2 since this
    /// core keeps no history
    pub fn from_param(param: u16) -> Option<Self> {
        match param {
            0 => Some(EraseMode::ToEnd),
            1 => Some(EraseMode::ToStart),
            2 | 3 => Some(EraseMode::All),
            _ => None,
        }
    }
}

/// One screen buffer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    grid: Grid,
    cursor: Cursor,
    saved_cursor: SavedCursor,
    /// Scroll region top (0-indexed, inclusive)
    scroll_top: usize,
    /// Scroll region bottom (0-indexed, inclusive)
    scroll_bottom: usize,
}

impl Screen {
    /// Create a new screen with the given dimensions
    pub fn new(cols: usize, rows: usize) -> Result<Self, TryReserveError> {
        Ok(Self {
            grid: Grid::try_new(cols, rows)?,
            cursor: Cursor::new(),
            saved_cursor: SavedCursor::default(),
            scroll_top: 0,
            scroll_bottom: rows.saturating_sub(1),
        })
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// The attributes applied to the next written cell
    pub fn pen(&self) -> &Pen {
        &self.cursor.pen
    }

    pub fn pen_mut(&mut self) -> &mut Pen {
        &mut self.cursor.pen
    }

    pub fn scroll_top(&self) -> usize {
        self.scroll_top
    }

    pub fn scroll_bottom(&self) -> usize {
        self.scroll_bottom
    }

    /// Copy of the cell at (row, col)
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        self.grid.read(row, col)
    }

    /// Get a line at the given row
    pub fn line(&self, row: usize) -> Option<&Row> {
        self.grid.row(row)
    }

    /// Print a character at the cursor with the current pen
    ///
    /// Writing into the last column wraps the cursor to column 0 of the next
    /// row at once, scrolling if the cursor is on the bottom margin.
    pub fn print(&mut self, ch: char) {
        let cell = self.cursor.pen.cell(ch);
        self.grid.write(self.cursor.row, self.cursor.col, cell);

        self.cursor.col += 1;
        if self.cursor.col >= self.cols() {
            self.cursor.col = 0;
            self.linefeed();
        }
    }

    /// Handle linefeed (LF): move down one row, scrolling at the bottom
    /// margin. The column is left unchanged.
    pub fn linefeed(&mut self) {
        let row = self.cursor.row;

        if row == self.scroll_bottom {
            self.scroll_up(1);
        } else if row + 1 < self.rows() {
            self.cursor.row += 1;
        }
    }

    /// Handle carriage return (CR)
    pub fn carriage_return(&mut self) {
        self.cursor.carriage_return();
    }

    /// Handle backspace (BS): one column left, never wrapping
    pub fn backspace(&mut self) {
        self.cursor.move_left(1);
    }

    /// Handle horizontal tab (HT)
    ///
    /// Advances to the next multiple of `width`, writing spaces with the
    /// current pen over the skipped cells. Stops at the last column.
    pub fn tab(&mut self, width: usize) {
        let width = width.max(1);
        let col = self.cursor.col;
        let target = ((col / width + 1) * width).min(self.cols().saturating_sub(1));

        let space = self.cursor.pen.cell(' ');
        for c in col..target {
            self.grid.write(self.cursor.row, c, space);
        }
        self.cursor.col = target.max(col);
    }

    /// Handle index (IND)
    pub fn index(&mut self) {
        self.linefeed();
    }

    /// Handle next line (NEL)
    pub fn next_line(&mut self) {
        self.linefeed();
        self.cursor.carriage_return();
    }

    /// Handle reverse index (RI): move up, scrolling down at the top margin
    pub fn reverse_index(&mut self) {
        let row = self.cursor.row;

        if row == self.scroll_top {
            self.scroll_down(1);
        } else if row > 0 {
            self.cursor.row -= 1;
        }
    }

    /// Scroll the region up by n lines (content moves up, blanks at bottom)
    pub fn scroll_up(&mut self, n: usize) {
        self.grid
            .scroll_up(n, self.scroll_top, self.scroll_bottom, Cell::default());
    }

    /// Scroll the region down by n lines (content moves down, blanks at top)
    pub fn scroll_down(&mut self, n: usize) {
        self.grid
            .scroll_down(n, self.scroll_top, self.scroll_bottom, Cell::default());
    }

    /// Set scroll region (DECSTBM), 0-indexed inclusive bounds
    ///
    /// An empty or inverted region resets to the full screen. The cursor is
    /// homed either way.
    pub fn set_scroll_region(&mut self, top: usize, bottom: usize) {
        let last = self.rows().saturating_sub(1);
        let bottom = bottom.min(last);

        if top < bottom {
            self.scroll_top = top;
            self.scroll_bottom = bottom;
        } else {
            self.reset_scroll_region();
        }
        self.move_cursor_to(0, 0);
    }

    /// Reset scroll region to full screen
    pub fn reset_scroll_region(&mut self) {
        self.scroll_top = 0;
        self.scroll_bottom = self.rows().saturating_sub(1);
    }

    /// Erase in display (ED)
    pub fn erase_in_display(&mut self, mode: EraseMode) {
        let Cursor { row, col, .. } = self.cursor;
        let blank = Cell::default();

        match mode {
            EraseMode::ToEnd => {
                self.grid.clear_range(row, col, self.cols(), blank);
                for r in row + 1..self.rows() {
                    self.grid.clear_row(r, blank);
                }
            }
            EraseMode::ToStart => {
                for r in 0..row {
                    self.grid.clear_row(r, blank);
                }
                self.grid.clear_range(row, 0, col + 1, blank);
            }
            EraseMode::All => self.grid.clear_all(blank),
        }
    }

    /// Erase in line (EL)
    pub fn erase_in_line(&mut self, mode: EraseMode) {
        let Cursor { row, col, .. } = self.cursor;
        let blank = Cell::default();

        match mode {
            EraseMode::ToEnd => self.grid.clear_range(row, col, self.cols(), blank),
            EraseMode::ToStart => self.grid.clear_range(row, 0, col + 1, blank),
            EraseMode::All => self.grid.clear_row(row, blank),
        }
    }

    /// Erase characters (ECH): clear n cells from the cursor, no shifting
    pub fn erase_chars(&mut self, n: usize) {
        let Cursor { row, col, .. } = self.cursor;
        self.grid
            .clear_range(row, col, col.saturating_add(n), Cell::default());
    }

    /// Reset every cell and home the cursor
    pub fn clear_screen(&mut self) {
        self.grid.clear_all(Cell::default());
        self.move_cursor_to(0, 0);
    }

    /// Insert lines (IL) at the cursor row, within the scroll region
    pub fn insert_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if row < self.scroll_top || row > self.scroll_bottom {
            return;
        }
        self.grid
            .insert_lines(row, n, self.scroll_bottom, Cell::default());
    }

    /// Delete lines (DL) at the cursor row, within the scroll region
    pub fn delete_lines(&mut self, n: usize) {
        let row = self.cursor.row;
        if row < self.scroll_top || row > self.scroll_bottom {
            return;
        }
        self.grid
            .delete_lines(row, n, self.scroll_bottom, Cell::default());
    }

    /// Insert blank characters (ICH)
    pub fn insert_chars(&mut self, n: usize) {
        let Cursor { row, col, .. } = self.cursor;
        self.grid.insert_chars(row, col, n, Cell::default());
    }

    /// Delete characters (DCH)
    pub fn delete_chars(&mut self, n: usize) {
        let Cursor { row, col, .. } = self.cursor;
        self.grid.delete_chars(row, col, n, Cell::default());
    }

    /// Move cursor to an absolute 0-indexed position (CUP/HVP), clamped
    pub fn move_cursor_to(&mut self, row: usize, col: usize) {
        let (rows, cols) = (self.rows(), self.cols());
        self.cursor.move_to(row, col, rows, cols);
    }

    /// Move cursor up (CUU)
    pub fn move_cursor_up(&mut self, n: usize) {
        self.cursor.move_up(n, self.scroll_top);
    }

    /// Move cursor down (CUD)
    pub fn move_cursor_down(&mut self, n: usize) {
        let rows = self.rows();
        self.cursor.move_down(n, self.scroll_bottom, rows);
    }

    /// Move cursor forward/right (CUF)
    pub fn move_cursor_forward(&mut self, n: usize) {
        let cols = self.cols();
        self.cursor.move_right(n, cols);
    }

    /// Move cursor backward/left (CUB)
    pub fn move_cursor_backward(&mut self, n: usize) {
        self.cursor.move_left(n);
    }

    /// Move cursor to column (CHA)
    pub fn move_cursor_to_col(&mut self, col: usize) {
        self.move_cursor_to(self.cursor.row, col);
    }

    /// Move cursor to row (VPA)
    pub fn move_cursor_to_row(&mut self, row: usize) {
        self.move_cursor_to(row, self.cursor.col);
    }

    /// Save cursor state (DECSC)
    pub fn save_cursor(&mut self) {
        self.saved_cursor = self.cursor.save();
    }

    /// Restore cursor state (DECRC)
    pub fn restore_cursor(&mut self) {
        let (rows, cols) = (self.rows(), self.cols());
        let saved = self.saved_cursor;
        self.cursor.restore(&saved, rows, cols);
    }

    /// Reset the screen to its initial state, keeping its geometry
    pub fn reset(&mut self) {
        self.cursor.reset();
        self.saved_cursor = SavedCursor::default();
        self.reset_scroll_region();
        self.clear_screen();
    }

    /// A copy of this screen at a new size
    ///
    /// Content is kept from the top-left corner; the scroll region is reset
    /// and the cursor clamped into the new bounds.
    pub fn resized(&self, cols: usize, rows: usize) -> Result<Self, TryReserveError> {
        let mut screen = Self {
            grid: self.grid.resized(cols, rows)?,
            cursor: self.cursor.clone(),
            saved_cursor: self.saved_cursor,
            scroll_top: 0,
            scroll_bottom: 0,
        };
        screen.reset_scroll_region();
        let Cursor { row, col, .. } = self.cursor;
        screen.move_cursor_to(row, col);
        Ok(screen)
    }
}
