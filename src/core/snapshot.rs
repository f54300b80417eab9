//! Deterministic snapshot generation
//!
//! Snapshots capture the visible terminal state in a serializable format
//! for testing and debugging. Given the same byte stream, the terminal
//! must produce identical snapshots.

use serde::{Deserialize, Serialize};

use super::cell::{Cell, Color, Style};
use crate::terminal::Terminal;

/// A complete snapshot of the terminal state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Screen dimensions
    pub cols: usize,
    pub rows: usize,
    /// Visible grid content of the active screen (row-major)
    pub grid: Vec<Vec<CellSnapshot>>,
    /// Cursor state
    pub cursor: CursorSnapshot,
    /// Scroll region
    pub scroll_top: usize,
    pub scroll_bottom: usize,
    /// Whether on alternate screen
    pub alternate_screen: bool,
}

/// Snapshot of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub ch: char,
    pub fg: ColorSnapshot,
    pub bg: ColorSnapshot,
    #[serde(default)]
    pub style: StyleSnapshot,
}

/// Snapshot of a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ColorSnapshot {
    Default,
    Indexed { index: u8 },
}

/// Snapshot of style attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StyleSnapshot {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dim: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub inverse: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// Snapshot of cursor state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursorSnapshot {
    pub col: usize,
    pub row: usize,
    pub visible: bool,
}

impl From<&Color> for ColorSnapshot {
    fn from(color: &Color) -> Self {
        match color {
            Color::Default => ColorSnapshot::Default,
            Color::Indexed(i) => ColorSnapshot::Indexed { index: *i },
        }
    }
}

impl From<&Style> for StyleSnapshot {
    fn from(style: &Style) -> Self {
        StyleSnapshot {
            bold: style.bold,
            dim: style.dim,
            inverse: style.inverse,
        }
    }
}

impl From<&Cell> for CellSnapshot {
    fn from(cell: &Cell) -> Self {
        CellSnapshot {
            ch: cell.ch,
            fg: ColorSnapshot::from(&cell.fg),
            bg: ColorSnapshot::from(&cell.bg),
            style: StyleSnapshot::from(&cell.style),
        }
    }
}

impl Snapshot {
    /// Create a snapshot of the active screen
    pub fn from_terminal(terminal: &Terminal) -> Self {
        let screen = terminal.screen();
        let grid = screen
            .grid()
            .iter_rows()
            .map(|row| row.cells.iter().map(CellSnapshot::from).collect())
            .collect();

        let cursor = screen.cursor();
        Snapshot {
            cols: screen.cols(),
            rows: screen.rows(),
            grid,
            cursor: CursorSnapshot {
                col: cursor.col,
                row: cursor.row,
                visible: terminal.cursor_visible(),
            },
            scroll_top: screen.scroll_top(),
            scroll_bottom: screen.scroll_bottom(),
            alternate_screen: terminal.is_alternate_screen(),
        }
    }

    /// Convert snapshot to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse snapshot from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get a simple text representation of the screen (for debugging)
    pub fn to_text(&self) -> String {
        let mut result = String::new();

        for row in &self.grid {
            let start = result.len();
            result.extend(row.iter().map(|cell| cell.ch));
            let trimmed = result[start..].trim_end_matches(' ').len();
            result.truncate(start + trimmed);
            result.push('\n');
        }

        // Remove trailing empty lines
        while result.ends_with("\n\n") {
            result.pop();
        }

        result
    }
}
