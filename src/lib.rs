//! vtgrid: a byte-stream terminal emulation core
//!
//! Turns the raw output of a child process into a grid of styled cells.
//! This crate provides:
//!
//! - `core`: cells, grid, cursor and the per-screen scroll engine
//! - `parser`: VT escape sequence and UTF-8 parser
//! - `terminal`: the [`Terminal`] that applies parsed actions to its screens
//! - `pty`: Unix PTY management
//! - `input`: key encoding for the child's input
//! - `app`: configuration and the host loop
//!
//! ```
//! use vtgrid::Terminal;
//!
//! let mut term = Terminal::new(80, 24, 1000).unwrap();
//! term.append(b"\x1b[1mhello\x1b[0m").unwrap();
//! assert_eq!(term.row_text(0).unwrap(), "hello");
//! assert!(term.cell_at(0, 0).unwrap().style.bold);
//! ```

pub mod app;
pub mod core;
pub mod input;
pub mod parser;
pub mod pty;
pub mod terminal;

pub use crate::core::{Cell, Color, Snapshot, Style};
pub use crate::terminal::{Terminal, TerminalError};
