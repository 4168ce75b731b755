//! Message parser
//!
//! Pure transformation of a complete frame into a [`ParsedMessage`]. The
//! decoder already guarantees well-formed frames; the checks here are kept
//! so the parser stands on its own.

use crate::device::DeviceId;
use crate::error::ParseError;
use crate::frame::{HEADER_LEN, SYNC_WORD};

/// Zero-copy view over one parsed frame
///
/// `payload` borrows from the frame buffer and must not be held past the
/// connection handler's scope; projections copy at the publish boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParsedMessage<'a> {
    /// 4-byte device identity
    pub device_id: DeviceId,

    /// Device-local sequence number, big-endian on the wire
    pub counter: u16,

    /// Routing discriminator
    pub message_type: u8,

    /// Raw payload bytes, exactly as declared by the length field
    pub payload: &'a [u8],
}

/// Parse a complete frame
pub fn parse_message(frame: &[u8]) -> Result<ParsedMessage<'_>, ParseError> {
    if frame.len() < HEADER_LEN {
        return Err(ParseError::too_short(frame.len()));
    }

    if frame[0..2] != SYNC_WORD {
        return Err(ParseError::BadSync(u16::from_be_bytes([
            frame[0], frame[1],
        ])));
    }

    let declared = u16::from_be_bytes([frame[9], frame[10]]) as usize;
    if HEADER_LEN + declared > frame.len() {
        return Err(ParseError::LengthMismatch {
            declared,
            available: frame.len() - HEADER_LEN,
        });
    }

    let device_id = DeviceId::new([frame[2], frame[3], frame[4], frame[5]]);

    Ok(ParsedMessage {
        device_id,
        counter: u16::from_be_bytes([frame[6], frame[7]]),
        message_type: frame[8],
        payload: &frame[HEADER_LEN..HEADER_LEN + declared],
    })
}
