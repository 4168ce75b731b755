//! Kafka publisher adapter
//!
//! Wraps an rdkafka `FutureProducer`. Acks, idempotence, compression, and
//! the per-publish deadline pass straight through to the client; records
//! are produced without an explicit timestamp so the broker assigns one.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::ClientConfig;
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;

use crate::publisher::{PublishError, Publisher, Record};

/// Kafka client configuration
#[derive(Debug, Clone)]
pub struct KafkaPublisherConfig {
    /// Bootstrap broker list (host:port, comma-separated)
    pub brokers: String,

    /// Client identifier reported to the broker
    pub client_id: Option<String>,

    /// Acknowledgement policy ("all", "1", "0")
    pub acks: String,

    /// Enable the idempotent producer
    pub idempotence: bool,

    /// Compression codec ("none", "gzip", "snappy", "lz4", "zstd")
    pub compression: String,

    /// Per-publish delivery deadline
    pub timeout: Duration,
}

impl Default for KafkaPublisherConfig {
    fn default() -> Self {
        Self {
            brokers: "127.0.0.1:9092".into(),
            client_id: None,
            acks: "all".into(),
            idempotence: true,
            compression: "none".into(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Publisher backed by an rdkafka `FutureProducer`
///
/// The producer is internally thread-safe and shared across every
/// connection handler.
pub struct KafkaPublisher {
    producer: FutureProducer,
    timeout: Duration,
}

impl KafkaPublisher {
    /// Create a producer from the given configuration
    pub fn new(config: &KafkaPublisherConfig) -> Result<Self, KafkaError> {
        let mut client = ClientConfig::new();
        client
            .set("bootstrap.servers", &config.brokers)
            .set("acks", &config.acks)
            .set(
                "enable.idempotence",
                if config.idempotence { "true" } else { "false" },
            )
            .set("compression.type", &config.compression)
            .set("message.timeout.ms", config.timeout.as_millis().to_string());

        if let Some(ref client_id) = config.client_id {
            client.set("client.id", client_id);
        }

        let producer: FutureProducer = client.create()?;

        tracing::info!(
            brokers = %config.brokers,
            acks = %config.acks,
            idempotence = config.idempotence,
            compression = %config.compression,
            "kafka publisher created"
        );

        Ok(Self {
            producer,
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl Publisher for KafkaPublisher {
    async fn publish(&self, record: Record) -> Result<(), PublishError> {
        let headers = record
            .headers
            .iter()
            .fold(OwnedHeaders::new(), |headers, (key, value)| {
                headers.insert(Header {
                    key: key.as_str(),
                    value: Some(value.as_str()),
                })
            });

        let future_record = FutureRecord::to(&record.topic)
            .key(&record.key)
            .payload(&record.value)
            .headers(headers);

        match self
            .producer
            .send(future_record, Timeout::After(self.timeout))
            .await
        {
            Ok(_) => Ok(()),
            Err((err, _)) => Err(map_kafka_error(&record.topic, err)),
        }
    }

    async fn flush(&self, deadline: Duration) -> Result<(), PublishError> {
        self.producer
            .flush(Timeout::After(deadline))
            .map_err(|err| PublishError::FlushFailed {
                reason: err.to_string(),
            })
    }
}

/// Map an rdkafka error onto the publish-error taxonomy
fn map_kafka_error(topic: &str, err: KafkaError) -> PublishError {
    if is_transient(&err) {
        PublishError::Transient {
            topic: topic.into(),
            reason: err.to_string(),
        }
    } else {
        PublishError::Fatal {
            topic: topic.into(),
            reason: err.to_string(),
        }
    }
}

/// Transient unless the broker tells us the record itself can never land
fn is_transient(err: &KafkaError) -> bool {
    match err {
        KafkaError::MessageProduction(code) => !matches!(
            code,
            RDKafkaErrorCode::MessageSizeTooLarge
                | RDKafkaErrorCode::InvalidMessage
                | RDKafkaErrorCode::InvalidMessageSize
                | RDKafkaErrorCode::UnknownTopicOrPartition
                | RDKafkaErrorCode::TopicAuthorizationFailed
        ),
        _ => true,
    }
}
