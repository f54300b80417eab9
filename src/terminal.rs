//! Terminal Executor
//!
//! Ties together the parser and the two screens, and applies parsed actions
//! to the active screen. This is the main integration point between parsing
//! and the screen model, and the public entry point of the crate.

use std::collections::TryReserveError;

use thiserror::Error;
use tracing::{debug, trace};

use crate::core::{Cell, Color, Cursor, EraseMode, Screen};
use crate::parser::{Action, ControlCode, CsiAction, EscAction, Parser};

/// Default distance between tab stops
pub const DEFAULT_TAB_WIDTH: usize = 4;

const PRIMARY: usize = 0;
const ALTERNATE: usize = 1;

/// Errors from creating or resizing a terminal
#[derive(Debug, Error)]
pub enum TerminalError {
    #[error("invalid terminal size {cols}x{rows}")]
    InvalidSize { cols: usize, rows: usize },

    #[error("failed to allocate terminal grid")]
    OutOfMemory(#[from] TryReserveError),
}

/// Terminal state: parser plus primary and alternate screens
#[derive(Debug, Clone)]
pub struct Terminal {
    screens: [Screen; 2],
    /// Index of the active screen in `screens`
    active: usize,
    parser: Parser,
    cursor_visible: bool,
    tab_width: usize,
    max_history: usize,
}

impl Terminal {
    /// Create a new terminal with the given dimensions
    ///
    /// `max_history` is recorded for the renderer; rows scrolled off the top
    /// are not retained here.
    pub fn new(cols: usize, rows: usize, max_history: usize) -> Result<Self, TerminalError> {
        if cols == 0 || rows == 0 {
            return Err(TerminalError::InvalidSize { cols, rows });
        }
        debug!(cols, rows, max_history, "creating terminal");

        Ok(Self {
            screens: [Screen::new(cols, rows)?, Screen::new(cols, rows)?],
            active: PRIMARY,
            parser: Parser::new(),
            cursor_visible: true,
            tab_width: DEFAULT_TAB_WIDTH,
            max_history,
        })
    }

    /// The active screen
    pub fn screen(&self) -> &Screen {
        &self.screens[self.active]
    }

    fn screen_mut(&mut self) -> &mut Screen {
        &mut self.screens[self.active]
    }

    pub fn primary_screen(&self) -> &Screen {
        &self.screens[PRIMARY]
    }

    pub fn alternate_screen(&self) -> &Screen {
        &self.screens[ALTERNATE]
    }

    pub fn is_alternate_screen(&self) -> bool {
        self.active == ALTERNATE
    }

    pub fn rows(&self) -> usize {
        self.screen().rows()
    }

    pub fn cols(&self) -> usize {
        self.screen().cols()
    }

    pub fn cursor(&self) -> &Cursor {
        self.screen().cursor()
    }

    pub fn cursor_visible(&self) -> bool {
        self.cursor_visible
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }

    pub fn tab_width(&self) -> usize {
        self.tab_width
    }

    /// Set the tab stop distance (at least 1)
    pub fn set_tab_width(&mut self, width: usize) {
        self.tab_width = width.max(1);
    }

    /// Copy of the cell at (row, col) on the active screen
    pub fn cell_at(&self, row: usize, col: usize) -> Option<Cell> {
        self.screen().cell(row, col)
    }

    /// Text of one row of the active screen, trailing blanks trimmed
    pub fn row_text(&self, row: usize) -> Option<String> {
        self.screen().line(row).map(|r| r.text())
    }

    /// Feed raw bytes from the child process
    ///
    /// Sequences may be split across calls at any byte. Malformed input is
    /// absorbed and never produces an error.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), TerminalError> {
        trace!(len = bytes.len(), "append");
        for &byte in bytes {
            if let Some(action) = self.parser.advance(byte) {
                self.apply_action(action);
            }
        }
        Ok(())
    }

    /// Resize both screens
    ///
    /// Either both screens take the new size or, on error, neither changes.
    pub fn resize(&mut self, cols: usize, rows: usize) -> Result<(), TerminalError> {
        if cols == 0 || rows == 0 {
            return Err(TerminalError::InvalidSize { cols, rows });
        }
        let [primary, alternate] = &self.screens;
        let resized = [primary.resized(cols, rows)?, alternate.resized(cols, rows)?];
        self.screens = resized;
        debug!(cols, rows, "terminal resized");
        Ok(())
    }

    /// Apply a single parsed action to the active screen
    fn apply_action(&mut self, action: Action) {
        match action {
            Action::Print(c) => self.screen_mut().print(c),
            Action::Control(code) => self.execute_control(code),
            Action::Csi(csi) => self.execute_csi(&csi),
            Action::Esc(esc) => self.execute_esc(esc),
        }
    }

    /// Execute a C0 control character
    fn execute_control(&mut self, code: ControlCode) {
        match code {
            ControlCode::Bell => debug!("bell"),
            ControlCode::Backspace => self.screen_mut().backspace(),
            ControlCode::Tab => {
                let width = self.tab_width;
                self.screen_mut().tab(width);
            }
            ControlCode::LineFeed | ControlCode::VerticalTab | ControlCode::FormFeed => {
                self.screen_mut().linefeed();
            }
            ControlCode::CarriageReturn => self.screen_mut().carriage_return(),
        }
    }

    /// Execute a CSI sequence
    fn execute_csi(&mut self, csi: &CsiAction) {
        if csi.intermediate {
            debug!(final_byte = %char::from(csi.final_byte), "ignored CSI with intermediates");
            return;
        }
        match csi.marker {
            None => {}
            Some(b'?') => return self.execute_csi_private(csi),
            Some(marker) => {
                debug!(
                    marker = %char::from(marker),
                    final_byte = %char::from(csi.final_byte),
                    "ignored CSI with parameter prefix"
                );
                return;
            }
        }

        if csi.final_byte == b'm' {
            return self.execute_sgr(csi);
        }

        let n = usize::from(csi.param_or_default(0, 1));
        let screen = self.screen_mut();

        match csi.final_byte {
            // Cursor movement
            b'A' => screen.move_cursor_up(n),
            b'B' => screen.move_cursor_down(n),
            b'C' => screen.move_cursor_forward(n),
            b'D' => screen.move_cursor_backward(n),
            b'E' => {
                // CNL - Cursor Next Line
                screen.move_cursor_down(n);
                screen.carriage_return();
            }
            b'F' => {
                // CPL - Cursor Previous Line
                screen.move_cursor_up(n);
                screen.carriage_return();
            }
            b'G' => screen.move_cursor_to_col(n - 1),
            b'H' | b'f' => {
                let row = usize::from(csi.param_or_default(0, 1)) - 1;
                let col = usize::from(csi.param_or_default(1, 1)) - 1;
                screen.move_cursor_to(row, col);
            }
            b'd' => screen.move_cursor_to_row(n - 1),

            // Erase operations
            b'J' => match EraseMode::from_param(csi.param(0, 0)) {
                Some(mode) => screen.erase_in_display(mode),
                None => debug!(mode = csi.param(0, 0), "unknown ED mode"),
            },
            b'K' => match EraseMode::from_param(csi.param(0, 0)) {
                Some(mode) => screen.erase_in_line(mode),
                None => debug!(mode = csi.param(0, 0), "unknown EL mode"),
            },
            b'X' => screen.erase_chars(n),

            // Insert/Delete
            b'L' => screen.insert_lines(n),
            b'M' => screen.delete_lines(n),
            b'@' => screen.insert_chars(n),
            b'P' => screen.delete_chars(n),

            // Scroll
            b'S' => screen.scroll_up(n),
            b'T' => screen.scroll_down(n),

            b'r' => {
                // DECSTBM - Set Top and Bottom Margins
                let top = usize::from(csi.param_or_default(0, 1)) - 1;
                let bottom = match csi.params.get(1) {
                    Some(0) | None => screen.rows().saturating_sub(1),
                    Some(b) => usize::from(b) - 1,
                };
                screen.set_scroll_region(top, bottom);
            }

            b's' => screen.save_cursor(),
            b'u' => screen.restore_cursor(),

            _ => {
                debug!(
                    params = ?csi.params.as_slice(),
                    final_byte = %char::from(csi.final_byte),
                    "unhandled CSI"
                );
            }
        }
    }

    /// Execute a private CSI sequence (starts with ?)
    fn execute_csi_private(&mut self, csi: &CsiAction) {
        let enable = match csi.final_byte {
            b'h' => true,
            b'l' => false,
            _ => {
                debug!(
                    params = ?csi.params.as_slice(),
                    final_byte = %char::from(csi.final_byte),
                    "unhandled private CSI"
                );
                return;
            }
        };
        for mode in csi.params.iter().flatten() {
            self.set_dec_mode(mode, enable);
        }
    }

    /// Set or reset a DEC private mode
    fn set_dec_mode(&mut self, mode: u16, enable: bool) {
        match mode {
            25 => {
                // DECTCEM - Text Cursor Enable Mode
                self.cursor_visible = enable;
            }
            47 | 1047 => {
                // Alternate screen buffer
                self.switch_screen(enable);
            }
            1048 => {
                // Save/restore cursor
                if enable {
                    self.screen_mut().save_cursor();
                } else {
                    self.screen_mut().restore_cursor();
                }
            }
            1049 => {
                // Alternate screen buffer with cursor save/restore
                if enable {
                    self.screens[PRIMARY].save_cursor();
                    self.switch_screen(true);
                } else {
                    self.switch_screen(false);
                    self.screens[PRIMARY].restore_cursor();
                }
            }
            _ => {
                debug!(mode, enable, "unknown DEC mode");
            }
        }
    }

    /// Flip the active screen; the inactive one is left exactly as it was
    fn switch_screen(&mut self, alternate: bool) {
        self.active = if alternate { ALTERNATE } else { PRIMARY };
        trace!(alternate, "switched screen");
    }

    /// Execute SGR (Select Graphic Rendition)
    fn execute_sgr(&mut self, csi: &CsiAction) {
        let params = csi.params.as_slice();
        let pen = self.screen_mut().pen_mut();

        if params.is_empty() {
            pen.reset();
            return;
        }

        let mut i = 0;
        while i < params.len() {
            let param = params[i].unwrap_or(0);
            match param {
                0 => pen.reset(),
                1 => pen.style.bold = true,
                2 => pen.style.dim = true,
                22 => {
                    pen.style.bold = false;
                    pen.style.dim = false;
                }
                7 => pen.style.inverse = true,
                27 => pen.style.inverse = false,
                30..=37 => pen.fg = Color::Indexed((param - 30) as u8),
                39 => pen.fg = Color::Default,
                40..=47 => pen.bg = Color::Indexed((param - 40) as u8),
                49 => pen.bg = Color::Default,
                90..=97 => pen.fg = Color::Indexed((param - 90 + 8) as u8),
                100..=107 => pen.bg = Color::Indexed((param - 100 + 8) as u8),
                38 | 48 => {
                    let (color, consumed) = extended_color(&params[i + 1..]);
                    if let Some(color) = color {
                        if param == 38 {
                            pen.fg = color;
                        } else {
                            pen.bg = color;
                        }
                    }
                    i += consumed;
                }
                _ => trace!(param, "ignored SGR parameter"),
            }
            i += 1;
        }
    }

    /// Execute an ESC sequence
    fn execute_esc(&mut self, esc: EscAction) {
        match esc {
            EscAction::SaveCursor => self.screen_mut().save_cursor(),
            EscAction::RestoreCursor => self.screen_mut().restore_cursor(),
            EscAction::Index => self.screen_mut().index(),
            EscAction::NextLine => self.screen_mut().next_line(),
            EscAction::ReverseIndex => self.screen_mut().reverse_index(),
            EscAction::FullReset => self.full_reset(),
        }
    }

    /// RIS: clear both screens, default attributes, primary screen active
    fn full_reset(&mut self) {
        for screen in &mut self.screens {
            screen.reset();
        }
        self.active = PRIMARY;
        self.cursor_visible = true;
        debug!("full reset");
    }
}

/// Decode the tail of an extended color (`38;5;N` or `38;2;R;G;B`)
///
/// Returns the color, if one applies, and how many parameters after the
/// `38`/`48` were consumed. Direct RGB colors are consumed but not applied.
fn extended_color(rest: &[Option<u16>]) -> (Option<Color>, usize) {
    match rest.first().copied().flatten() {
        Some(5) if rest.len() >= 2 => {
            let index = u8::try_from(rest[1].unwrap_or(0)).ok();
            (index.map(Color::Indexed), 2)
        }
        Some(2) => {
            trace!("direct RGB color ignored");
            (None, rest.len().min(4))
        }
        _ => {
            trace!("incomplete extended color ignored");
            (None, 0)
        }
    }
}
