//! Incremental UTF-8 decoding
//!
//! The decoder sees bytes one at a time and keeps its partial codepoint
//! across calls, so a character split between two reads still decodes.
//! Broken sequences are dropped without a replacement character.

/// Outcome of feeding one byte to the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Utf8Step {
    /// A complete character
    Char(char),
    /// More continuation bytes are needed
    Pending,
    /// The byte (or the sequence it completed) was dropped
    Invalid,
    /// A pending sequence was abandoned; the byte was not consumed
    Interrupted,
}

/// Codepoint accumulator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Utf8Decoder {
    partial: u32,
    remaining: u8,
    /// Smallest codepoint the current sequence length may encode
    min: u32,
}

fn is_continuation(byte: u8) -> bool {
    byte & 0xC0 == 0x80
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a multi-byte sequence is in progress
    pub fn is_pending(&self) -> bool {
        self.remaining > 0
    }

    /// Drop any partial sequence
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one byte
    ///
    /// While a sequence is pending, a non-continuation byte resets the
    /// decoder and returns [`Utf8Step::Interrupted`]; the caller then handles
    /// the byte as if no sequence had been started.
    pub fn feed(&mut self, byte: u8) -> Utf8Step {
        if self.remaining > 0 {
            if !is_continuation(byte) {
                self.reset();
                return Utf8Step::Interrupted;
            }
            self.partial = (self.partial << 6) | u32::from(byte & 0x3F);
            self.remaining -= 1;
            if self.remaining > 0 {
                return Utf8Step::Pending;
            }
            let (value, min) = (self.partial, self.min);
            self.reset();
            if value < min {
                return Utf8Step::Invalid;
            }
            return char::from_u32(value).map_or(Utf8Step::Invalid, Utf8Step::Char);
        }

        let (partial, remaining, min) = match byte {
            0x00..=0x7F => return Utf8Step::Char(char::from(byte)),
            0xC0..=0xDF => (u32::from(byte & 0x1F), 1, 0x80),
            0xE0..=0xEF => (u32::from(byte & 0x0F), 2, 0x800),
            0xF0..=0xF7 => (u32::from(byte & 0x07), 3, 0x1_0000),
            // Stray continuation or invalid lead byte
            _ => return Utf8Step::Invalid,
        };
        self.partial = partial;
        self.remaining = remaining;
        self.min = min;
        Utf8Step::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> Vec<Utf8Step> {
        let mut decoder = Utf8Decoder::new();
        bytes.iter().map(|&b| decoder.feed(b)).collect()
    }

    #[test]
    fn test_multibyte() {
        assert_eq!(
            decode("é".as_bytes()),
            vec![Utf8Step::Pending, Utf8Step::Char('é')]
        );
        assert_eq!(decode("€".as_bytes()).last(), Some(&Utf8Step::Char('€')));
        assert_eq!(decode("🦀".as_bytes()).last(), Some(&Utf8Step::Char('🦀')));
    }

    #[test]
    fn test_state_survives_between_feeds() {
        let mut decoder = Utf8Decoder::new();
        let bytes = "中".as_bytes();
        assert_eq!(decoder.feed(bytes[0]), Utf8Step::Pending);
        assert!(decoder.is_pending());
        assert_eq!(decoder.feed(bytes[1]), Utf8Step::Pending);
        assert_eq!(decoder.feed(bytes[2]), Utf8Step::Char('中'));
        assert!(!decoder.is_pending());
    }

    #[test]
    fn test_interrupted_sequence() {
        let mut decoder = Utf8Decoder::new();
        assert_eq!(decoder.feed(0xE2), Utf8Step::Pending);
        assert_eq!(decoder.feed(b'A'), Utf8Step::Interrupted);
        assert!(!decoder.is_pending());
        assert_eq!(decoder.feed(b'A'), Utf8Step::Char('A'));
    }

    #[test]
    fn test_invalid_bytes() {
        assert_eq!(decode(&[0x80]), vec![Utf8Step::Invalid]);
        assert_eq!(decode(&[0xFF]), vec![Utf8Step::Invalid]);
        // Overlong encoding of '/'
        assert_eq!(decode(&[0xC0, 0xAF]).last(), Some(&Utf8Step::Invalid));
        // Surrogate half
        assert_eq!(decode(&[0xED, 0xA0, 0x80]).last(), Some(&Utf8Step::Invalid));
        // Beyond U+10FFFF
        assert_eq!(
            decode(&[0xF7, 0xBF, 0xBF, 0xBF]).last(),
            Some(&Utf8Step::Invalid)
        );
    }
}
