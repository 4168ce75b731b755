//! Frame decoder tests

use crate::frame::{FrameDecoder, HEADER_LEN, SYNC_WORD, encode_frame};
use crate::{DeviceId, FrameError, parse_message};

const CAP: usize = 1024 * 1024;

/// The canonical S1 frame: device 01-02-03-04, counter 1, type 2, payload [1,2,3]
fn sample_frame() -> Vec<u8> {
    encode_frame(DeviceId::new([1, 2, 3, 4]), 1, 2, &[1, 2, 3])
}

fn drain(decoder: &mut FrameDecoder) -> Vec<Vec<u8>> {
    let mut frames = Vec::new();
    while let Some(frame) = decoder.next_frame() {
        frames.push(frame.to_vec());
    }
    frames
}

#[test]
fn test_encode_layout() {
    let frame = sample_frame();
    assert_eq!(
        frame,
        vec![0xAA, 0x55, 1, 2, 3, 4, 0x00, 0x01, 0x02, 0x00, 0x03, 1, 2, 3]
    );
}

#[test]
fn test_single_frame() {
    let mut decoder = FrameDecoder::new(CAP);
    decoder.extend(&sample_frame()).unwrap();

    let frames = drain(&mut decoder);
    assert_eq!(frames, vec![sample_frame()]);
    assert_eq!(decoder.pending(), 0);
}

#[test]
fn test_empty_payload_frame() {
    let frame = encode_frame(DeviceId::new([9, 9, 9, 9]), 7, 13, &[]);
    assert_eq!(frame.len(), HEADER_LEN);

    let mut decoder = FrameDecoder::new(CAP);
    decoder.extend(&frame).unwrap();
    assert_eq!(drain(&mut decoder), vec![frame]);
}

#[test]
fn test_back_to_back_frames() {
    let a = encode_frame(DeviceId::new([1, 1, 1, 1]), 1, 2, b"aa");
    let b = encode_frame(DeviceId::new([2, 2, 2, 2]), 2, 1, b"bbb");

    let mut stream = a.clone();
    stream.extend_from_slice(&b);

    let mut decoder = FrameDecoder::new(CAP);
    decoder.extend(&stream).unwrap();
    assert_eq!(drain(&mut decoder), vec![a, b]);
}

#[test]
fn test_resync_discards_garbage_prefix() {
    let mut stream = vec![0xFF, 0xFF, 0xFF];
    stream.extend_from_slice(&sample_frame());

    let mut decoder = FrameDecoder::new(CAP);
    decoder.extend(&stream).unwrap();
    assert_eq!(drain(&mut decoder), vec![sample_frame()]);
}

#[test]
fn test_resync_garbage_between_frames() {
    let frame = sample_frame();
    let mut stream = frame.clone();
    stream.extend_from_slice(&[0x00, 0xAA, 0x00]);
    stream.extend_from_slice(&frame);

    let mut decoder = FrameDecoder::new(CAP);
    decoder.extend(&stream).unwrap();
    assert_eq!(drain(&mut decoder), vec![frame.clone(), frame]);
}

#[test]
fn test_sync_word_inside_payload_not_a_frame_start() {
    // Payload deliberately contains the sync sequence
    let payload = [0x00, 0xAA, 0x55, 0x00];
    let a = encode_frame(DeviceId::new([1, 2, 3, 4]), 1, 2, &payload);
    let b = encode_frame(DeviceId::new([5, 6, 7, 8]), 2, 1, b"x");

    let mut stream = a.clone();
    stream.extend_from_slice(&b);

    let mut decoder = FrameDecoder::new(CAP);
    decoder.extend(&stream).unwrap();

    let frames = drain(&mut decoder);
    assert_eq!(frames, vec![a, b]);
    assert_eq!(parse_message(&frames[0]).unwrap().payload, &payload);
}

#[test]
fn test_chunking_invariance_byte_at_a_time() {
    let frame = sample_frame();
    let mut stream = vec![0xFF];
    stream.extend_from_slice(&frame);
    stream.extend_from_slice(&frame);

    let mut whole = FrameDecoder::new(CAP);
    whole.extend(&stream).unwrap();
    let expected = drain(&mut whole);

    let mut dribbled = FrameDecoder::new(CAP);
    let mut got = Vec::new();
    for byte in &stream {
        dribbled.extend(std::slice::from_ref(byte)).unwrap();
        got.extend(drain(&mut dribbled));
    }
    assert_eq!(got, expected);
    assert_eq!(got.len(), 2);
}

#[test]
fn test_chunking_invariance_all_split_points() {
    let frame = sample_frame();
    for split in 0..frame.len() {
        let mut decoder = FrameDecoder::new(CAP);
        decoder.extend(&frame[..split]).unwrap();
        assert!(decoder.next_frame().is_none(), "split at {split}");
        decoder.extend(&frame[split..]).unwrap();
        assert_eq!(drain(&mut decoder), vec![frame.clone()], "split at {split}");
    }
}

#[test]
fn test_sync_word_split_across_chunks() {
    let frame = sample_frame();

    let mut decoder = FrameDecoder::new(CAP);
    // Garbage ending in the first sync byte, then the rest of the frame
    decoder.extend(&[0x01, 0x02, SYNC_WORD[0]]).unwrap();
    assert!(decoder.next_frame().is_none());
    decoder.extend(&frame[1..]).unwrap();
    assert_eq!(drain(&mut decoder), vec![frame]);
}

#[test]
fn test_garbage_without_sync_is_discarded() {
    let mut decoder = FrameDecoder::new(CAP);
    decoder.extend(&[0x01, 0x02, 0x03, 0x04]).unwrap();
    assert!(decoder.next_frame().is_none());
    assert_eq!(decoder.pending(), 0);
}

#[test]
fn test_overflow_on_incomplete_frame() {
    let mut decoder = FrameDecoder::new(64);

    // Header declares a 65535-byte payload that never fully arrives
    let header = encode_frame(DeviceId::new([1, 2, 3, 4]), 1, 2, &[]);
    let mut oversized = header[..9].to_vec();
    oversized.extend_from_slice(&u16::MAX.to_be_bytes());
    decoder.extend(&oversized).unwrap();
    assert!(decoder.next_frame().is_none());

    let err = decoder.extend(&[0u8; 100]).unwrap_err();
    assert_eq!(
        err,
        FrameError::Overflow {
            pending: oversized.len() + 100,
            cap: 64
        }
    );
}

#[test]
fn test_large_payload_roundtrip() {
    let payload: Vec<u8> = (0..u16::MAX).map(|i| (i % 251) as u8).collect();
    let frame = encode_frame(DeviceId::new([0xAA, 0x55, 0xAA, 0x55]), 42, 11, &payload);

    let mut decoder = FrameDecoder::new(CAP);
    decoder.extend(&frame).unwrap();
    let frames = drain(&mut decoder);
    assert_eq!(frames.len(), 1);

    let msg = parse_message(&frames[0]).unwrap();
    assert_eq!(msg.payload, &payload[..]);
}
