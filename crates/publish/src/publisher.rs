//! Publisher capability
//!
//! The gateway depends only on this contract; the broker client behind it
//! is swappable (production Kafka adapter, in-memory test double).

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Value of the `source` header on every published record
pub const HEADER_SOURCE: (&str, &str) = ("source", "message-sender-service");

/// Value of the `version` header on every published record
pub const HEADER_VERSION: (&str, &str) = ("version", "1.0");

/// One record bound for a downstream topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// Destination topic
    pub topic: String,

    /// Partitioning key (hex-formatted device id)
    pub key: String,

    /// Record value bytes (JSON envelope or raw payload)
    pub value: Vec<u8>,

    /// Record headers as key/value pairs
    pub headers: Vec<(String, String)>,
}

impl Record {
    /// Standard header set: `source`, `version`, and the correlation id
    pub fn standard_headers(correlation_id: &str) -> Vec<(String, String)> {
        vec![
            (HEADER_SOURCE.0.into(), HEADER_SOURCE.1.into()),
            (HEADER_VERSION.0.into(), HEADER_VERSION.1.into()),
            ("correlationId".into(), correlation_id.into()),
        ]
    }
}

/// Delivery failures surfaced to the connection handler
///
/// The handler treats every variant the same way by default (log, count,
/// drop the single message); the split exists for metrics labels and for
/// operators reading logs.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Failure the broker client may succeed on later
    #[error("transient publish failure on {topic}: {reason}")]
    Transient { topic: String, reason: String },

    /// Failure that will not resolve without intervention
    #[error("fatal publish failure on {topic}: {reason}")]
    Fatal { topic: String, reason: String },

    /// Record value could not be encoded
    #[error("record encoding failed: {0}")]
    Encode(#[from] serde_json::Error),

    /// Drain of in-flight deliveries failed; not scoped to one topic
    #[error("flush failed: {reason}")]
    FlushFailed { reason: String },
}

impl PublishError {
    /// True if retrying the same record could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Stable label for `publish_errors_total{error}`
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transient { .. } => "transient",
            Self::Fatal { .. } => "fatal",
            Self::Encode(_) => "encode",
            Self::FlushFailed { .. } => "flush",
        }
    }
}

/// Capability to deliver records to the downstream log
///
/// Implementations must be internally concurrent-safe: one shared instance
/// serves every connection handler. The core never retries at this layer;
/// idempotence and retries belong to the broker client.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Deliver one record, waiting at most the adapter's configured deadline
    async fn publish(&self, record: Record) -> Result<(), PublishError>;

    /// Drain in-flight deliveries, waiting at most `deadline`
    async fn flush(&self, deadline: Duration) -> Result<(), PublishError>;

    /// Release the underlying client
    ///
    /// Default implementation drains with a 30 second deadline.
    async fn close(&self) -> Result<(), PublishError> {
        self.flush(Duration::from_secs(30)).await
    }
}
