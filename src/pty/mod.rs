//! PTY (Pseudoterminal) handling
//!
//! This module provides functionality for creating and managing pseudoterminals,
//! spawning child processes, and moving bytes between the host and the child.

#[cfg(unix)]
mod unix;

#[cfg(unix)]
pub use unix::Pty;

/// Error type for PTY operations
#[derive(Debug, thiserror::Error)]
pub enum PtyError {
    #[error("Failed to open PTY master: {0}")]
    OpenMaster(#[source] nix::Error),

    #[error("Failed to grant PTY access: {0}")]
    GrantPty(#[source] nix::Error),

    #[error("Failed to unlock PTY: {0}")]
    UnlockPty(#[source] nix::Error),

    #[error("Failed to get PTY slave name: {0}")]
    PtsName(#[source] nix::Error),

    #[error("Invalid program or argument {0:?}: contains a NUL byte")]
    InvalidArgument(String),

    #[error("Failed to fork: {0}")]
    Fork(#[source] nix::Error),

    #[error("Failed to set window size: {0}")]
    SetWinsize(#[source] nix::Error),

    #[error("Failed to get window size: {0}")]
    GetWinsize(#[source] nix::Error),

    #[error("Failed to read from PTY: {0}")]
    Read(#[source] nix::Error),

    #[error("Failed to write to PTY: {0}")]
    Write(#[source] nix::Error),

    #[error("Failed to set non-blocking mode: {0}")]
    SetNonBlocking(#[source] nix::Error),

    #[error("Failed to poll: {0}")]
    Poll(#[source] nix::Error),

    #[error("Failed to signal child: {0}")]
    Signal(#[source] nix::Error),

    #[error("Failed to wait for child: {0}")]
    Wait(#[source] nix::Error),
}

/// Result type for PTY operations
pub type PtyResult<T> = Result<T, PtyError>;

/// Outcome of a non-blocking read from the PTY master
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes were read into the buffer
    Data(usize),
    /// Nothing available right now
    WouldBlock,
    /// The child side is closed; the session is over
    Eof,
}

/// Window size for PTY
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub rows: u16,
    pub cols: u16,
    pub pixel_width: u16,
    pub pixel_height: u16,
}

impl WindowSize {
    /// Create a new window size with just rows and columns
    pub fn new(cols: u16, rows: u16) -> Self {
        Self {
            rows,
            cols,
            pixel_width: 0,
            pixel_height: 0,
        }
    }

    /// Window size for a terminal grid, saturating at `u16::MAX`
    pub fn from_grid(cols: usize, rows: usize) -> Self {
        let clamp = |v: usize| u16::try_from(v).unwrap_or(u16::MAX);
        Self::new(clamp(cols), clamp(rows))
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self::new(80, 24)
    }
}
