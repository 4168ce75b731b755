//! Gateway source errors

use std::time::Duration;

use fleetgate_protocol::FrameError;
use fleetgate_publish::PublishError;
use thiserror::Error;

/// Errors from the acceptor and connection handlers
#[derive(Debug, Error)]
pub enum TcpGatewayError {
    /// Failed to bind the listen socket
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Socket I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Per-connection framing buffer exceeded its cap
    #[error(transparent)]
    Framing(#[from] FrameError),

    /// No bytes for the configured idle deadline
    #[error("connection idle for {0:?}")]
    IdleTimeout(Duration),

    /// Publish failure, surfaced only when the connection is configured to
    /// disconnect on publish errors
    #[error("publish failure: {0}")]
    Publish(#[from] PublishError),
}
