//! Fleetgate Protocol - Core wire types for the device ingestion gateway
//!
//! This crate provides the foundational types that flow through the gateway:
//! - `FrameDecoder` - Self-synchronizing frame extraction from a TCP byte stream
//! - `ParsedMessage` - Zero-copy view over a complete frame
//! - `DeviceId` - 4-byte opaque device identity
//!
//! # Wire Format
//!
//! Each frame starts with the two-byte sync word `0xAA 0x55`; all multi-byte
//! fields are big-endian:
//!
//! ```text
//! offset  size  field
//!   0      2   sync word = 0xAA 0x55
//!   2      4   device id
//!   6      2   counter
//!   8      1   type
//!   9      2   payload length L
//!  11      L   payload
//! ```
//!
//! # Design Principles
//!
//! - **Zero-copy**: frames are handed out as `bytes::Bytes` slices of the
//!   decoder's buffer; parsing borrows the frame without reallocating
//! - **Self-synchronizing**: garbage before a sync word is discarded, so a
//!   misaligned or corrupted stream recovers at the next frame boundary
//! - **Bounded**: the decoder enforces a pending-bytes cap so a peer that
//!   dribbles bytes forever cannot pin memory

mod device;
mod error;
mod frame;
mod message;

pub use device::DeviceId;
pub use error::{FrameError, ParseError};
pub use frame::{
    FrameDecoder, HEADER_LEN, MAX_FRAME_LEN, MAX_PAYLOAD_LEN, SYNC_WORD, encode_frame,
};
pub use message::{ParsedMessage, parse_message};

// Re-export bytes for convenience
pub use bytes::{Bytes, BytesMut};

// Test modules - only compiled during testing
#[cfg(test)]
mod frame_test;
#[cfg(test)]
mod message_test;
