//! Message parser tests

use crate::frame::encode_frame;
use crate::{DeviceId, ParseError, parse_message};

#[test]
fn test_parse_happy_path() {
    let frame = vec![
        0xAA, 0x55, // sync
        0x01, 0x02, 0x03, 0x04, // device id
        0x00, 0x01, // counter
        0x02, // type
        0x00, 0x03, // payload length
        0x01, 0x02, 0x03, // payload
    ];

    let msg = parse_message(&frame).unwrap();
    assert_eq!(msg.device_id, DeviceId::new([1, 2, 3, 4]));
    assert_eq!(msg.device_id.to_string(), "01-02-03-04");
    assert_eq!(msg.counter, 1);
    assert_eq!(msg.message_type, 2);
    assert_eq!(msg.payload, &[1, 2, 3]);
}

#[test]
fn test_parse_big_endian_fields() {
    let frame = encode_frame(DeviceId::new([1, 2, 3, 4]), 0x0102, 14, &[0xAB; 0x0201]);
    assert_eq!(frame[6..8], [0x01, 0x02]);
    assert_eq!(frame[9..11], [0x02, 0x01]);

    let msg = parse_message(&frame).unwrap();
    assert_eq!(msg.counter, 258);
    assert_eq!(msg.payload.len(), 513);
}

#[test]
fn test_parse_empty_payload() {
    let frame = encode_frame(DeviceId::new([1, 2, 3, 4]), 9, 13, &[]);
    let msg = parse_message(&frame).unwrap();
    assert_eq!(msg.payload, &[] as &[u8]);
}

#[test]
fn test_parse_too_short() {
    let err = parse_message(&[0xAA, 0x55, 0x01]).unwrap_err();
    assert_eq!(
        err,
        ParseError::TooShort {
            expected: 11,
            actual: 3
        }
    );
    assert_eq!(err.reason(), "frame_too_short");
}

#[test]
fn test_parse_bad_sync() {
    let mut frame = encode_frame(DeviceId::new([1, 2, 3, 4]), 1, 2, &[]);
    frame[0] = 0xAB;
    let err = parse_message(&frame).unwrap_err();
    assert_eq!(err, ParseError::BadSync(0xAB55));
    assert_eq!(err.reason(), "bad_sync_word");
}

#[test]
fn test_parse_length_mismatch() {
    let mut frame = encode_frame(DeviceId::new([1, 2, 3, 4]), 1, 2, &[1, 2, 3]);
    // Declare one more byte than the frame holds
    frame[10] = 0x04;
    let err = parse_message(&frame).unwrap_err();
    assert_eq!(
        err,
        ParseError::LengthMismatch {
            declared: 4,
            available: 3
        }
    );
    assert_eq!(err.reason(), "length_mismatch");
}

#[test]
fn test_encode_parse_roundtrip() {
    let cases = [
        (DeviceId::new([0, 0, 0, 0]), 0u16, 0u8, vec![]),
        (DeviceId::new([1, 2, 3, 4]), 1, 2, vec![1, 2, 3]),
        (DeviceId::new([0xFF; 4]), u16::MAX, u8::MAX, vec![0x42; 300]),
    ];

    for (device_id, counter, message_type, payload) in cases {
        let frame = encode_frame(device_id, counter, message_type, &payload);
        let msg = parse_message(&frame).unwrap();
        assert_eq!(msg.device_id, device_id);
        assert_eq!(msg.counter, counter);
        assert_eq!(msg.message_type, message_type);
        assert_eq!(msg.payload, &payload[..]);
    }
}
