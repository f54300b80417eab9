//! Terminal Cell
//!
//! Represents a single cell in the terminal grid, containing one decoded
//! codepoint and the attributes it was written with.

use serde::{Deserialize, Serialize};

/// A single cell in the terminal grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// The character in this cell
    pub ch: char,
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Text style attributes
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Color::Default,
            bg: Color::Default,
            style: Style::default(),
        }
    }
}

impl Cell {
    /// Create a new cell with a single character and default attributes
    pub fn new(ch: char) -> Self {
        Self {
            ch,
            ..Default::default()
        }
    }

    /// Create a new cell with content and attributes
    pub fn with_style(ch: char, fg: Color, bg: Color, style: Style) -> Self {
        Self { ch, fg, bg, style }
    }

    /// Check if this cell shows nothing (a space with default attributes)
    pub fn is_blank(&self) -> bool {
        *self == Self::default()
    }

    /// Clear the cell to default state
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Palette color reference
///
/// SGR 30-37/90-97 produce indices 0-15; the `38;5;N` form can address the
/// full 256-entry palette. Mapping indices to RGB is the renderer's job.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    /// Default terminal color (foreground or background)
    #[default]
    Default,
    /// Palette index
    Indexed(u8),
}

impl Color {
    /// Standard ANSI colors (0-7)
    pub const BLACK: Color = Color::Indexed(0);
    pub const RED: Color = Color::Indexed(1);
    pub const GREEN: Color = Color::Indexed(2);
    pub const YELLOW: Color = Color::Indexed(3);
    pub const BLUE: Color = Color::Indexed(4);
    pub const MAGENTA: Color = Color::Indexed(5);
    pub const CYAN: Color = Color::Indexed(6);
    pub const WHITE: Color = Color::Indexed(7);

    /// Bright ANSI colors (8-15)
    pub const BRIGHT_BLACK: Color = Color::Indexed(8);
    pub const BRIGHT_RED: Color = Color::Indexed(9);
    pub const BRIGHT_GREEN: Color = Color::Indexed(10);
    pub const BRIGHT_YELLOW: Color = Color::Indexed(11);
    pub const BRIGHT_BLUE: Color = Color::Indexed(12);
    pub const BRIGHT_MAGENTA: Color = Color::Indexed(13);
    pub const BRIGHT_CYAN: Color = Color::Indexed(14);
    pub const BRIGHT_WHITE: Color = Color::Indexed(15);

    /// The palette index, if any
    pub fn index(&self) -> Option<u8> {
        match self {
            Color::Default => None,
            Color::Indexed(i) => Some(*i),
        }
    }
}

/// Text style attributes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    pub bold: bool,
    pub dim: bool,
    pub inverse: bool,
}

impl Style {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
