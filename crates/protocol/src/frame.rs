//! Frame decoder
//!
//! Stateful, per-connection extraction of complete frames from an arbitrary
//! sequence of byte chunks. The decoder owns a growable buffer; callers
//! append chunks with [`FrameDecoder::extend`] and then drain complete
//! frames with [`FrameDecoder::next_frame`].
//!
//! Resynchronization: bytes before the first sync word are discarded, so the
//! decoder recovers from mid-stream garbage or a misaligned start. Once a
//! sync word heads the buffer the decoder is committed to that frame - it
//! never re-scans bytes inside an in-progress payload, so a sync word
//! appearing inside a payload is never mistaken for a frame start.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::FrameError;

/// Two-byte constant marking the start of every frame
pub const SYNC_WORD: [u8; 2] = [0xAA, 0x55];

/// Fixed header size: sync (2) + device id (4) + counter (2) + type (1) + length (2)
pub const HEADER_LEN: usize = 11;

/// Maximum payload length representable by the 16-bit length field
pub const MAX_PAYLOAD_LEN: usize = u16::MAX as usize;

/// Maximum size of a single frame on the wire
pub const MAX_FRAME_LEN: usize = HEADER_LEN + MAX_PAYLOAD_LEN;

/// Stateful frame decoder for one connection's byte stream
#[derive(Debug)]
pub struct FrameDecoder {
    /// Accumulated bytes not yet emitted as frames
    buf: BytesMut,

    /// Cap on pending bytes before the connection must be torn down
    max_pending: usize,
}

impl FrameDecoder {
    /// Create a decoder with the given pending-bytes cap
    pub fn new(max_pending: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            max_pending,
        }
    }

    /// Number of bytes buffered but not yet emitted
    #[inline]
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Append a chunk of input
    ///
    /// Fails if the pending byte count exceeds the cap; the connection must
    /// then be closed without draining further frames.
    pub fn extend(&mut self, chunk: &[u8]) -> Result<(), FrameError> {
        self.buf.extend_from_slice(chunk);
        if self.buf.len() > self.max_pending {
            return Err(FrameError::Overflow {
                pending: self.buf.len(),
                cap: self.max_pending,
            });
        }
        Ok(())
    }

    /// Extract the next complete frame, if one is available
    ///
    /// Returns `None` when more input is needed. Garbage before the sync
    /// word is consumed as a side effect.
    pub fn next_frame(&mut self) -> Option<Bytes> {
        match find_sync(&self.buf) {
            Some(0) => {}
            Some(offset) => self.buf.advance(offset),
            None => {
                // A trailing 0xAA may pair with a 0x55 in the next chunk
                let keep = usize::from(self.buf.last() == Some(&SYNC_WORD[0]));
                let discard = self.buf.len() - keep;
                if discard > 0 {
                    self.buf.advance(discard);
                }
                return None;
            }
        }

        if self.buf.len() < HEADER_LEN {
            return None;
        }

        let declared = u16::from_be_bytes([self.buf[9], self.buf[10]]) as usize;
        let total = HEADER_LEN + declared;
        if self.buf.len() < total {
            return None;
        }

        Some(self.buf.split_to(total).freeze())
    }
}

/// Find the offset of the first sync word in `buf`
#[inline]
fn find_sync(buf: &[u8]) -> Option<usize> {
    buf.windows(SYNC_WORD.len()).position(|w| w == SYNC_WORD)
}

/// Encode a message into its wire form
///
/// Used by tests and client tooling; the gateway itself only decodes.
///
/// # Panics
///
/// Panics if `payload` exceeds [`MAX_PAYLOAD_LEN`].
pub fn encode_frame(
    device_id: crate::DeviceId,
    counter: u16,
    message_type: u8,
    payload: &[u8],
) -> Vec<u8> {
    assert!(payload.len() <= MAX_PAYLOAD_LEN, "payload too large");

    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len());
    frame.extend_from_slice(&SYNC_WORD);
    frame.extend_from_slice(device_id.as_bytes());
    frame.extend_from_slice(&counter.to_be_bytes());
    frame.push(message_type);
    frame.extend_from_slice(&(payload.len() as u16).to_be_bytes());
    frame.extend_from_slice(payload);
    frame
}
