//! Publisher configuration
//!
//! Settings passed through to the Kafka client, plus the two destination
//! topics.

use serde::Deserialize;
use std::time::Duration;

/// Downstream publisher configuration
///
/// # Example
///
/// ```toml
/// [publisher]
/// brokers = "kafka-1:9092,kafka-2:9092"
/// device_message_topic = "device-messages"
/// device_event_topic = "device-events"
/// acks = "all"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Bootstrap broker list (host:port, comma-separated)
    /// Default: "127.0.0.1:9092"
    pub brokers: String,

    /// Client identifier reported to the broker
    /// Default: none (client library default)
    pub client_id: Option<String>,

    /// Topic for enveloped device messages
    /// Default: "device-messages"
    pub device_message_topic: String,

    /// Topic for raw device events
    /// Default: "device-events"
    pub device_event_topic: String,

    /// Per-publish delivery deadline
    /// Default: 30s
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Acknowledgement policy: "all", "-1", "1", or "0"
    /// Default: "all"
    pub acks: String,

    /// Enable the idempotent producer
    /// Default: true
    pub idempotence: bool,

    /// Compression codec: "none", "gzip", "snappy", "lz4", or "zstd"
    /// Default: "none"
    pub compression: String,
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            brokers: "127.0.0.1:9092".into(),
            client_id: None,
            device_message_topic: "device-messages".into(),
            device_event_topic: "device-events".into(),
            timeout: Duration::from_secs(30),
            acks: "all".into(),
            idempotence: true,
            compression: "none".into(),
        }
    }
}
