//! Terminal Actions
//!
//! Semantic operations produced by the parser that should be applied to the screen.

use serde::{Deserialize, Serialize};

use super::params::Params;

/// A terminal action produced by the parser
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Print a character to the screen
    Print(char),

    /// Execute a C0 control character
    Control(ControlCode),

    /// Execute a CSI (Control Sequence Introducer) command
    Csi(CsiAction),

    /// Execute an ESC sequence (non-CSI)
    Esc(EscAction),
}

/// C0 control codes the terminal acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlCode {
    /// BEL - Bell
    Bell,
    /// BS - Backspace
    Backspace,
    /// HT - Horizontal Tab
    Tab,
    /// LF - Line Feed
    LineFeed,
    /// VT - Vertical Tab (treated as LF)
    VerticalTab,
    /// FF - Form Feed (treated as LF)
    FormFeed,
    /// CR - Carriage Return
    CarriageReturn,
}

impl ControlCode {
    /// Map a C0 byte to a control code; bytes without an effect give `None`
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x07 => Some(ControlCode::Bell),
            0x08 => Some(ControlCode::Backspace),
            0x09 => Some(ControlCode::Tab),
            0x0A => Some(ControlCode::LineFeed),
            0x0B => Some(ControlCode::VerticalTab),
            0x0C => Some(ControlCode::FormFeed),
            0x0D => Some(ControlCode::CarriageReturn),
            _ => None,
        }
    }
}

/// CSI (Control Sequence Introducer) actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsiAction {
    /// The final byte that identifies the command (0x40-0x7E)
    pub final_byte: u8,
    /// Parameters (semicolon-separated numbers)
    pub params: Params,
    /// Parameter-prefix marker (`?`, `>`, `<` or `=`) seen right after `CSI`
    pub marker: Option<u8>,
    /// Whether intermediate bytes (0x20-0x2F) or a misplaced marker were seen
    pub intermediate: bool,
}

impl CsiAction {
    pub fn new(final_byte: u8) -> Self {
        Self {
            final_byte,
            params: Params::default(),
            marker: None,
            intermediate: false,
        }
    }

    /// Whether this is a DEC private sequence (`CSI ? ...`)
    pub fn is_private(&self) -> bool {
        self.marker == Some(b'?')
    }

    /// Get parameter at index, or default value if omitted
    pub fn param(&self, index: usize, default: u16) -> u16 {
        self.params.get(index).unwrap_or(default)
    }

    /// Get parameter at index, treating 0 as default
    pub fn param_or_default(&self, index: usize, default: u16) -> u16 {
        match self.params.get(index) {
            Some(0) | None => default,
            Some(v) => v,
        }
    }
}

/// ESC sequence actions (non-CSI)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EscAction {
    /// ESC 7 - Save cursor (DECSC)
    SaveCursor,

    /// ESC 8 - Restore cursor (DECRC)
    RestoreCursor,

    /// ESC D - Index (IND) - move cursor down, scroll if at bottom
    Index,

    /// ESC E - Next Line (NEL) - move to beginning of next line
    NextLine,

    /// ESC M - Reverse Index (RI) - move cursor up, scroll if at top
    ReverseIndex,

    /// ESC c - Full Reset (RIS)
    FullReset,
}

impl EscAction {
    pub fn from_final(byte: u8) -> Option<Self> {
        match byte {
            b'7' => Some(EscAction::SaveCursor),
            b'8' => Some(EscAction::RestoreCursor),
            b'D' => Some(EscAction::Index),
            b'E' => Some(EscAction::NextLine),
            b'M' => Some(EscAction::ReverseIndex),
            b'c' => Some(EscAction::FullReset),
            _ => None,
        }
    }
}
