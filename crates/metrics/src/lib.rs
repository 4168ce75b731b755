//! Fleetgate Metrics - Gateway instruments and health
//!
//! One [`GatewayMetrics`] instance owns a prometheus `Registry` with every
//! instrument the gateway records. It is created at startup and injected
//! into the acceptor and connection handlers as an `Arc`; the instruments
//! are internally concurrent-safe and updates are fire-and-forget.
//!
//! Serving the registry over HTTP is an external concern; this crate only
//! carries the contract.

mod health;

pub use health::HealthFlag;

use prometheus::{
    HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};

/// Buckets for per-frame processing time (sub-millisecond to one second)
const PROCESSING_BUCKETS: &[f64] = &[
    0.0001, 0.00025, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Buckets for publish latency (one millisecond up to the 30s deadline)
const PUBLISH_BUCKETS: &[f64] = &[
    0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
];

/// All gateway instruments, registered in one registry
#[derive(Debug)]
pub struct GatewayMetrics {
    registry: Registry,

    /// Fresh messages published to the device-message topic
    pub device_messages_processed: IntCounter,

    /// Fresh messages published to the device-event topic
    pub device_events_processed: IntCounter,

    /// Messages dropped because the counter was already observed
    pub duplicate_messages_rejected: IntCounter,

    /// Messages dropped before routing, labeled by reason
    pub invalid_messages_rejected: IntCounterVec,

    /// Failed publishes, labeled by topic and error class
    pub publish_errors: IntCounterVec,

    /// Per-frame processing time, labeled by message type
    pub message_processing_duration: HistogramVec,

    /// Publish latency, labeled by topic
    pub publish_duration: HistogramVec,

    /// Currently active connections
    pub active_connections: IntGauge,

    /// Connections accepted since startup
    pub connections_total: IntCounter,

    /// Connections closed at accept because the admission cap was reached
    pub connections_rejected: IntCounter,
}

impl GatewayMetrics {
    /// Create and register every instrument
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let device_messages_processed = IntCounter::new(
            "device_messages_processed_total",
            "Fresh device messages published to the device-message topic",
        )?;
        let device_events_processed = IntCounter::new(
            "device_events_processed_total",
            "Fresh device events published to the device-event topic",
        )?;
        let duplicate_messages_rejected = IntCounter::new(
            "duplicate_messages_rejected_total",
            "Messages dropped because their counter was already observed",
        )?;
        let invalid_messages_rejected = IntCounterVec::new(
            Opts::new(
                "invalid_messages_rejected_total",
                "Messages dropped before routing, by reason",
            ),
            &["reason"],
        )?;
        let publish_errors = IntCounterVec::new(
            Opts::new("publish_errors_total", "Failed publishes by topic and error"),
            &["topic", "error"],
        )?;
        let message_processing_duration = HistogramVec::new(
            HistogramOpts::new(
                "message_processing_duration_seconds",
                "Time from frame extraction to disposition",
            )
            .buckets(PROCESSING_BUCKETS.to_vec()),
            &["message_type"],
        )?;
        let publish_duration = HistogramVec::new(
            HistogramOpts::new("publish_duration_seconds", "Publisher call latency")
                .buckets(PUBLISH_BUCKETS.to_vec()),
            &["topic"],
        )?;
        let active_connections =
            IntGauge::new("active_connections", "Currently active device connections")?;
        let connections_total =
            IntCounter::new("connections_total", "Connections accepted since startup")?;
        let connections_rejected = IntCounter::new(
            "connections_rejected_total",
            "Connections closed at accept because the admission cap was reached",
        )?;

        registry.register(Box::new(device_messages_processed.clone()))?;
        registry.register(Box::new(device_events_processed.clone()))?;
        registry.register(Box::new(duplicate_messages_rejected.clone()))?;
        registry.register(Box::new(invalid_messages_rejected.clone()))?;
        registry.register(Box::new(publish_errors.clone()))?;
        registry.register(Box::new(message_processing_duration.clone()))?;
        registry.register(Box::new(publish_duration.clone()))?;
        registry.register(Box::new(active_connections.clone()))?;
        registry.register(Box::new(connections_total.clone()))?;
        registry.register(Box::new(connections_rejected.clone()))?;

        Ok(Self {
            registry,
            device_messages_processed,
            device_events_processed,
            duplicate_messages_rejected,
            invalid_messages_rejected,
            publish_errors,
            message_processing_duration,
            publish_duration,
            active_connections,
            connections_total,
            connections_rejected,
        })
    }

    /// The registry holding every gateway instrument
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Record an accepted connection
    #[inline]
    pub fn connection_opened(&self) {
        self.active_connections.inc();
        self.connections_total.inc();
    }

    /// Record a finished connection
    #[inline]
    pub fn connection_closed(&self) {
        self.active_connections.dec();
    }

    /// Record a connection rejected at the admission cap
    #[inline]
    pub fn connection_rejected(&self) {
        self.connections_rejected.inc();
    }

    /// Record a message dropped before routing
    #[inline]
    pub fn record_invalid(&self, reason: &str) {
        self.invalid_messages_rejected
            .with_label_values(&[reason])
            .inc();
    }

    /// Record a failed publish
    #[inline]
    pub fn record_publish_error(&self, topic: &str, error: &str) {
        self.publish_errors.with_label_values(&[topic, error]).inc();
    }

    /// Observe one frame's processing time
    #[inline]
    pub fn observe_processing(&self, message_type: u8, seconds: f64) {
        self.message_processing_duration
            .with_label_values(&[&message_type.to_string()])
            .observe(seconds);
    }

    /// Observe one publish's latency
    #[inline]
    pub fn observe_publish(&self, topic: &str, seconds: f64) {
        self.publish_duration.with_label_values(&[topic]).observe(seconds);
    }
}
