//! Protocol error types

use thiserror::Error;

/// Errors raised by the frame decoder
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    /// Pending bytes exceeded the configured cap before a frame completed
    #[error("framing buffer overflow: {pending} pending bytes exceed cap of {cap}")]
    Overflow { pending: usize, cap: usize },
}

/// Errors raised when parsing a complete frame into a message
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// Frame is too short to contain the fixed header
    #[error("frame too short: expected at least {expected} bytes, got {actual}")]
    TooShort { expected: usize, actual: usize },

    /// First two bytes are not the sync word
    #[error("bad sync word: {0:#06X}")]
    BadSync(u16),

    /// Declared payload length exceeds the bytes present in the frame
    #[error("payload length mismatch: declared {declared} bytes, frame holds {available}")]
    LengthMismatch { declared: usize, available: usize },
}

impl ParseError {
    /// Create a too-short error
    #[inline]
    pub fn too_short(actual: usize) -> Self {
        Self::TooShort {
            expected: crate::HEADER_LEN,
            actual,
        }
    }

    /// Stable label for rejection metrics
    pub fn reason(&self) -> &'static str {
        match self {
            Self::TooShort { .. } => "frame_too_short",
            Self::BadSync(_) => "bad_sync_word",
            Self::LengthMismatch { .. } => "length_mismatch",
        }
    }
}
