//! CSI parameter accumulation
//!
//! Parameters are collected one byte at a time. Each value is an
//! `Option<u16>`: `None` for an omitted parameter (`CSI ;5H`), `Some` once a
//! digit has been seen. Values saturate at `u16::MAX` and at most
//! [`MAX_PARAMS`] are kept; the rest are dropped as they are closed.

use serde::{Deserialize, Serialize};

/// Maximum number of parameters retained per sequence
pub const MAX_PARAMS: usize = 16;

/// Parameter list of one CSI sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Params {
    values: Vec<Option<u16>>,
    #[serde(skip)]
    current: Option<u16>,
    /// A digit or separator has been seen since the last reset
    #[serde(skip)]
    started: bool,
    /// Inside a `:` sub-parameter; its digits are ignored
    #[serde(skip)]
    in_subparam: bool,
}

impl Params {
    /// Build a finished parameter list
    pub fn from_slice(values: &[Option<u16>]) -> Self {
        let mut params = Self::default();
        params
            .values
            .extend(values.iter().copied().take(MAX_PARAMS));
        params
    }

    /// Reset for a new sequence, keeping the allocation
    pub fn clear(&mut self) {
        self.values.clear();
        self.current = None;
        self.started = false;
        self.in_subparam = false;
    }

    /// Fold one decimal digit into the current parameter
    pub fn push_digit(&mut self, digit: u8) {
        self.started = true;
        if self.in_subparam {
            return;
        }
        let value = self.current.unwrap_or(0);
        self.current = Some(
            value
                .saturating_mul(10)
                .saturating_add(u16::from(digit.wrapping_sub(b'0'))),
        );
    }

    /// Close the current parameter (`;`)
    pub fn next_param(&mut self) {
        self.started = true;
        self.close();
    }

    /// Start a sub-parameter (`:`); the rest of this parameter is skipped
    pub fn start_subparam(&mut self) {
        self.started = true;
        self.in_subparam = true;
    }

    /// Close the last parameter once the final byte arrives
    pub fn finish(&mut self) {
        if self.started {
            self.close();
            self.started = false;
        }
    }

    fn close(&mut self) {
        if self.values.len() < MAX_PARAMS {
            self.values.push(self.current);
        }
        self.current = None;
        self.in_subparam = false;
    }

    /// Whether no digit or separator has been seen yet
    pub fn is_pristine(&self) -> bool {
        !self.started && self.values.is_empty()
    }

    /// Parameter at index; `None` when omitted or missing
    pub fn get(&self, index: usize) -> Option<u16> {
        self.values.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<u16>> + '_ {
        self.values.iter().copied()
    }

    pub fn as_slice(&self) -> &[Option<u16>] {
        &self.values
    }
}
