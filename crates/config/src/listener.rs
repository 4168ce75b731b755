//! Listener configuration
//!
//! The TCP acceptor and the per-connection limits it hands to handlers.

use serde::Deserialize;
use std::time::Duration;

/// TCP listener configuration
///
/// # Example
///
/// ```toml
/// [listener]
/// port = 50100
/// max_connections = 100
/// idle_timeout = "30s"
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address
    /// Default: "0.0.0.0"
    pub address: String,

    /// Listen port
    /// Default: 50100
    pub port: u16,

    /// Admission cap on concurrent connections
    /// Default: 100
    pub max_connections: usize,

    /// Bytes read from the socket per read call
    /// Default: 4096
    pub read_buffer_size: usize,

    /// Framing buffer cap before the connection is force-closed
    /// Default: 1 MiB
    pub max_pending_bytes: usize,

    /// Read/write idle deadline per connection
    /// Default: 30s
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,

    /// Enable TCP_NODELAY on accepted sockets
    /// Default: true
    pub nodelay: bool,

    /// Enable TCP keepalive on accepted sockets
    /// Default: true
    pub keepalive: bool,

    /// Close the connection when a publish fails instead of dropping the
    /// single message
    /// Default: false (upstream broker retries are expected to mask
    /// transient publisher issues)
    pub disconnect_on_publish_error: bool,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".into(),
            port: 50100,
            max_connections: 100,
            read_buffer_size: 4096,
            max_pending_bytes: 1024 * 1024,
            idle_timeout: Duration::from_secs(30),
            nodelay: true,
            keepalive: true,
            disconnect_on_publish_error: false,
        }
    }
}

impl ListenerConfig {
    /// Get the socket address to bind to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}
