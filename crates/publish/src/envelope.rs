//! Record projections
//!
//! Builds the publishable [`Record`] for each routing class. Device
//! messages get a JSON envelope; device events carry the raw payload as
//! the record value (the Kafka publisher is byte-valued, so no base64
//! detour on that path - base64 appears only inside the envelope).

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::{DateTime, SecondsFormat, Utc};
use fleetgate_protocol::ParsedMessage;
use serde::Serialize;

use crate::publisher::{PublishError, Record};

/// JSON envelope published to the device-message topic
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeviceMessageEnvelope<'a> {
    device_id: String,
    message_counter: u16,
    message_type: u8,
    timestamp: String,
    payload: String,
    payload_size: usize,
    correlation_id: &'a str,
}

/// Project a fresh message into its device-message record
///
/// `received_at` is the wall-clock instant the frame parsed; it becomes the
/// envelope's `timestamp` in ISO-8601 UTC.
pub fn device_message_record(
    msg: &ParsedMessage<'_>,
    topic: &str,
    received_at: DateTime<Utc>,
    correlation_id: &str,
) -> Result<Record, PublishError> {
    let envelope = DeviceMessageEnvelope {
        device_id: msg.device_id.to_string(),
        message_counter: msg.counter,
        message_type: msg.message_type,
        timestamp: received_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        payload: BASE64.encode(msg.payload),
        payload_size: msg.payload.len(),
        correlation_id,
    };

    Ok(Record {
        topic: topic.into(),
        key: envelope.device_id.clone(),
        value: serde_json::to_vec(&envelope)?,
        headers: Record::standard_headers(correlation_id),
    })
}

/// Project a fresh message into its device-event record
///
/// No envelope and no metadata wrapping: the payload bytes are the value.
pub fn device_event_record(
    msg: &ParsedMessage<'_>,
    topic: &str,
    correlation_id: &str,
) -> Record {
    Record {
        topic: topic.into(),
        key: msg.device_id.to_string(),
        value: msg.payload.to_vec(),
        headers: Record::standard_headers(correlation_id),
    }
}
