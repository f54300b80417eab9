//! Terminal Core Module
//!
//! Platform-independent terminal state management. This module contains:
//! - Cell representation with attributes
//! - Cell grid with bounds-checked access and row shifting
//! - Cursor state and positioning
//! - Screen model (one per primary/alternate buffer)
//! - Deterministic snapshot generation
//!
//! The core is completely deterministic: given the same sequence of terminal
//! actions, it will always produce the same state.

mod cell;
mod cursor;
mod grid;
mod screen;
mod snapshot;

pub use cell::{Cell, Color, Style};
pub use cursor::{Cursor, Pen, SavedCursor};
pub use grid::{Grid, Row};
pub use screen::{EraseMode, Screen};
pub use snapshot::{CellSnapshot, ColorSnapshot, CursorSnapshot, Snapshot, StyleSnapshot};
