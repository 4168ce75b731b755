//! Configuration validation
//!
//! Catches configurations that would parse but cannot run: zero caps,
//! empty topics, values the Kafka client would reject at startup.

use fleetgate_protocol::MAX_FRAME_LEN;

use crate::error::{ConfigError, Result};
use crate::Config;

const VALID_ACKS: &[&str] = &["all", "-1", "0", "1"];
const VALID_COMPRESSION: &[&str] = &["none", "gzip", "snappy", "lz4", "zstd"];

/// Validate the full configuration
pub fn validate_config(config: &Config) -> Result<()> {
    let listener = &config.listener;

    if listener.port == 0 {
        return Err(ConfigError::invalid("listener.port", "must be non-zero"));
    }
    if listener.max_connections == 0 {
        return Err(ConfigError::invalid(
            "listener.max_connections",
            "must be at least 1",
        ));
    }
    if listener.read_buffer_size == 0 {
        return Err(ConfigError::invalid(
            "listener.read_buffer_size",
            "must be at least 1",
        ));
    }
    if listener.max_pending_bytes < MAX_FRAME_LEN {
        return Err(ConfigError::invalid(
            "listener.max_pending_bytes",
            format!("must be at least one maximum frame ({MAX_FRAME_LEN} bytes)"),
        ));
    }
    if listener.idle_timeout.is_zero() {
        return Err(ConfigError::invalid(
            "listener.idle_timeout",
            "must be non-zero",
        ));
    }

    if config.dedup.entries_per_device == 0 {
        return Err(ConfigError::invalid(
            "dedup.entries_per_device",
            "must be at least 1",
        ));
    }

    let publisher = &config.publisher;

    if publisher.brokers.trim().is_empty() {
        return Err(ConfigError::invalid("publisher.brokers", "must not be empty"));
    }
    if publisher.device_message_topic.trim().is_empty() {
        return Err(ConfigError::invalid(
            "publisher.device_message_topic",
            "must not be empty",
        ));
    }
    if publisher.device_event_topic.trim().is_empty() {
        return Err(ConfigError::invalid(
            "publisher.device_event_topic",
            "must not be empty",
        ));
    }
    if publisher.timeout.is_zero() {
        return Err(ConfigError::invalid(
            "publisher.timeout",
            "must be non-zero",
        ));
    }
    if !VALID_ACKS.contains(&publisher.acks.as_str()) {
        return Err(ConfigError::invalid(
            "publisher.acks",
            format!("'{}' is not one of {VALID_ACKS:?}", publisher.acks),
        ));
    }
    if !VALID_COMPRESSION.contains(&publisher.compression.as_str()) {
        return Err(ConfigError::invalid(
            "publisher.compression",
            format!(
                "'{}' is not one of {VALID_COMPRESSION:?}",
                publisher.compression
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::{Config, ConfigError};

    fn assert_invalid(toml: &str, field: &str) {
        match Config::from_str(toml) {
            Err(ConfigError::Invalid { field: f, .. }) => assert_eq!(f, field),
            other => panic!("expected Invalid({field}), got {other:?}"),
        }
    }

    #[test]
    fn test_zero_port_rejected() {
        assert_invalid("[listener]\nport = 0", "listener.port");
    }

    #[test]
    fn test_zero_max_connections_rejected() {
        assert_invalid("[listener]\nmax_connections = 0", "listener.max_connections");
    }

    #[test]
    fn test_small_pending_cap_rejected() {
        assert_invalid(
            "[listener]\nmax_pending_bytes = 1024",
            "listener.max_pending_bytes",
        );
    }

    #[test]
    fn test_empty_topic_rejected() {
        assert_invalid(
            "[publisher]\ndevice_event_topic = \"\"",
            "publisher.device_event_topic",
        );
    }

    #[test]
    fn test_bad_acks_rejected() {
        assert_invalid("[publisher]\nacks = \"most\"", "publisher.acks");
    }

    #[test]
    fn test_bad_compression_rejected() {
        assert_invalid(
            "[publisher]\ncompression = \"brotli\"",
            "publisher.compression",
        );
    }

    #[test]
    fn test_zero_dedup_entries_rejected() {
        assert_invalid("[dedup]\nentries_per_device = 0", "dedup.entries_per_device");
    }

    #[test]
    fn test_defaults_are_valid() {
        Config::from_str("").unwrap();
    }
}
