//! Parser State Machine
//!
//! Byte-driven VT parser. The parser handles arbitrary chunk boundaries: all
//! in-flight state (escape progress, CSI parameters, partial UTF-8) lives in
//! [`Parser`] and survives between calls.
//!
//! # State Machine
//!
//! A reduced form of the model described in
//! "A parser for DEC's ANSI-compatible video terminals" by Paul Williams
//! (<https://vt100.net/emu/dec_ansi_parser>):
//!
//! - Normal: text, C0 controls and UTF-8
//! - Escape: after ESC, waiting for the final byte
//! - EscapeIntermediate: ESC followed by intermediate bytes (`ESC ( B`)
//! - Csi: after `ESC [`, collecting parameters until a final byte
//! - Osc: inside an OSC (or DCS/SOS/PM/APC) string, discarding payload
//! - OscEscape: saw ESC inside a string, expecting `\`
//!
//! Every state has one handler that returns the next state. Each byte yields
//! at most one action.

use tracing::{debug, trace};

use super::action::{Action, ControlCode, CsiAction, EscAction};
use super::params::Params;
use super::utf8::{Utf8Decoder, Utf8Step};

const ESC: u8 = 0x1B;
const CAN: u8 = 0x18;
const SUB: u8 = 0x1A;
const BEL: u8 = 0x07;
const DEL: u8 = 0x7F;

/// Parser state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum State {
    #[default]
    Normal,
    Escape,
    EscapeIntermediate,
    Csi,
    Osc,
    OscEscape,
}

/// The terminal parser
#[derive(Debug, Clone, Default)]
pub struct Parser {
    state: State,
    /// Parameters of the CSI sequence being collected
    params: Params,
    /// Parameter-prefix marker of the current CSI sequence
    marker: Option<u8>,
    /// Intermediate bytes were seen in the current CSI sequence
    intermediate: bool,
    utf8: Utf8Decoder,
}

impl Parser {
    /// Create a new parser in the normal state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state (for tests and diagnostics)
    pub fn state(&self) -> State {
        self.state
    }

    /// Reset the parser to initial state
    pub fn reset(&mut self) {
        self.state = State::Normal;
        self.clear_csi();
        self.utf8.reset();
    }

    fn clear_csi(&mut self) {
        self.params.clear();
        self.marker = None;
        self.intermediate = false;
    }

    /// Process a chunk of bytes, returning actions
    pub fn parse(&mut self, data: &[u8]) -> Vec<Action> {
        data.iter().filter_map(|&byte| self.advance(byte)).collect()
    }

    /// Process a single byte
    pub fn advance(&mut self, byte: u8) -> Option<Action> {
        let (next, action) = match self.state {
            State::Normal => self.normal(byte),
            State::Escape => self.escape(byte),
            State::EscapeIntermediate => self.escape_intermediate(byte),
            State::Csi => self.csi(byte),
            State::Osc => self.osc(byte),
            State::OscEscape => self.osc_escape(byte),
        };
        self.state = next;
        action
    }

    fn normal(&mut self, byte: u8) -> (State, Option<Action>) {
        if self.utf8.is_pending() {
            match self.utf8.feed(byte) {
                Utf8Step::Char(c) => return (State::Normal, Some(Action::Print(c))),
                Utf8Step::Pending => return (State::Normal, None),
                Utf8Step::Invalid => {
                    trace!("dropped invalid UTF-8 sequence");
                    return (State::Normal, None);
                }
                Utf8Step::Interrupted => {
                    trace!(byte, "UTF-8 sequence interrupted");
                }
            }
        }

        match byte {
            ESC => (State::Escape, None),
            0x00..=0x1F => (State::Normal, ControlCode::from_byte(byte).map(Action::Control)),
            0x20..=0x7E => (State::Normal, Some(Action::Print(char::from(byte)))),
            DEL => (State::Normal, None),
            _ => match self.utf8.feed(byte) {
                Utf8Step::Char(c) => (State::Normal, Some(Action::Print(c))),
                Utf8Step::Invalid => {
                    trace!(byte, "ignored stray UTF-8 byte");
                    (State::Normal, None)
                }
                Utf8Step::Pending | Utf8Step::Interrupted => (State::Normal, None),
            },
        }
    }

    /// C0 control received inside a sequence: executed in place, except
    /// CAN/SUB (abort) and ESC (restart)
    fn control_in_sequence(&mut self, byte: u8, state: State) -> (State, Option<Action>) {
        match byte {
            CAN | SUB => (State::Normal, None),
            ESC => (State::Escape, None),
            _ => (state, ControlCode::from_byte(byte).map(Action::Control)),
        }
    }

    fn escape(&mut self, byte: u8) -> (State, Option<Action>) {
        match byte {
            0x00..=0x1F => self.control_in_sequence(byte, State::Escape),
            b'[' => {
                self.clear_csi();
                (State::Csi, None)
            }
            // OSC, and DCS/SOS/PM/APC whose payloads are discarded the same way
            b']' | b'P' | b'X' | b'^' | b'_' => (State::Osc, None),
            0x20..=0x2F => (State::EscapeIntermediate, None),
            _ => match EscAction::from_final(byte) {
                Some(action) => (State::Normal, Some(Action::Esc(action))),
                None => {
                    debug!(byte, "unhandled ESC sequence");
                    (State::Normal, None)
                }
            },
        }
    }

    fn escape_intermediate(&mut self, byte: u8) -> (State, Option<Action>) {
        match byte {
            0x00..=0x1F => self.control_in_sequence(byte, State::EscapeIntermediate),
            0x20..=0x2F => (State::EscapeIntermediate, None),
            _ => {
                debug!(byte, "ignored ESC sequence with intermediates");
                (State::Normal, None)
            }
        }
    }

    fn csi(&mut self, byte: u8) -> (State, Option<Action>) {
        match byte {
            0x00..=0x1F => self.control_in_sequence(byte, State::Csi),
            b'0'..=b'9' => {
                self.params.push_digit(byte);
                (State::Csi, None)
            }
            b';' => {
                self.params.next_param();
                (State::Csi, None)
            }
            b':' => {
                self.params.start_subparam();
                (State::Csi, None)
            }
            b'<'..=b'?' => {
                if self.params.is_pristine() && self.marker.is_none() {
                    self.marker = Some(byte);
                } else {
                    self.intermediate = true;
                }
                (State::Csi, None)
            }
            0x20..=0x2F => {
                self.intermediate = true;
                (State::Csi, None)
            }
            0x40..=0x7E => {
                self.params.finish();
                let csi = CsiAction {
                    final_byte: byte,
                    params: std::mem::take(&mut self.params),
                    marker: self.marker.take(),
                    intermediate: std::mem::take(&mut self.intermediate),
                };
                (State::Normal, Some(Action::Csi(csi)))
            }
            DEL => (State::Csi, None),
            _ => {
                debug!(byte, "aborted CSI sequence on non-ASCII byte");
                self.clear_csi();
                (State::Normal, None)
            }
        }
    }

    fn osc(&mut self, byte: u8) -> (State, Option<Action>) {
        match byte {
            BEL => {
                trace!("OSC terminated by BEL");
                (State::Normal, None)
            }
            ESC => (State::OscEscape, None),
            CAN | SUB => (State::Normal, None),
            _ => (State::Osc, None),
        }
    }

    fn osc_escape(&mut self, byte: u8) -> (State, Option<Action>) {
        if byte == b'\\' {
            trace!("OSC terminated by ST");
            return (State::Normal, None);
        }
        // ESC ended the string; this byte is the final of a new escape
        self.escape(byte)
    }
}
