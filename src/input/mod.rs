//! Input Encoding Module
//!
//! Translates key presses into the byte sequences a VT100-compatible child
//! expects on its input. Cursor keys use the normal (non-application) CSI
//! form; F1-F4 use SS3 as on a VT100.

/// Special keys that produce escape sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    // Cursor keys
    Up,
    Down,
    Left,
    Right,

    // Navigation
    Home,
    End,
    PageUp,
    PageDown,
    Insert,
    Delete,

    // Function keys
    F1,
    F2,
    F3,
    F4,
    F5,
    F6,
    F7,
    F8,
    F9,
    F10,
    F11,
    F12,

    // Editing
    Backspace,
    Tab,
    Enter,
    Escape,
}

/// Encode a special key press into its terminal byte sequence
pub fn encode_key(key: Key) -> &'static [u8] {
    match key {
        Key::Up => b"\x1b[A",
        Key::Down => b"\x1b[B",
        Key::Right => b"\x1b[C",
        Key::Left => b"\x1b[D",

        Key::Home => b"\x1b[1~",
        Key::Insert => b"\x1b[2~",
        Key::Delete => b"\x1b[3~",
        Key::End => b"\x1b[4~",
        Key::PageUp => b"\x1b[5~",
        Key::PageDown => b"\x1b[6~",

        Key::F1 => b"\x1bOP",
        Key::F2 => b"\x1bOQ",
        Key::F3 => b"\x1bOR",
        Key::F4 => b"\x1bOS",
        Key::F5 => b"\x1b[15~",
        Key::F6 => b"\x1b[17~",
        Key::F7 => b"\x1b[18~",
        Key::F8 => b"\x1b[19~",
        Key::F9 => b"\x1b[20~",
        Key::F10 => b"\x1b[21~",
        Key::F11 => b"\x1b[23~",
        Key::F12 => b"\x1b[24~",

        // DEL, not BS
        Key::Backspace => b"\x7f",
        Key::Tab => b"\t",
        // The line discipline maps CR to NL anyway; send NL directly
        Key::Enter => b"\n",
        Key::Escape => b"\x1b",
    }
}

/// Encode a character, optionally with Ctrl held
///
/// Ctrl with a letter or one of `@[\]^_` produces the matching C0 byte;
/// Ctrl+`?` produces DEL. Anything else is sent as UTF-8.
pub fn encode_char(c: char, ctrl: bool) -> Vec<u8> {
    if ctrl {
        match c {
            'a'..='z' | 'A'..='Z' => return vec![(c.to_ascii_uppercase() as u8) - b'@'],
            '@' | '[' | '\\' | ']' | '^' | '_' => return vec![(c as u8) - b'@'],
            ' ' => return vec![0x00],
            '?' => return vec![0x7f],
            _ => {}
        }
    }
    let mut buf = [0u8; 4];
    c.encode_utf8(&mut buf).as_bytes().to_vec()
}
