//! TCP Gateway - acceptor with bounded admission
//!
//! Owns the listening socket and the admission budget. Each accepted
//! connection must win an admission permit before its handler task is
//! spawned; when no permit is available the socket is closed immediately
//! and the rejection counted - accepts are never queued behind admission.
//!
//! # Shutdown
//!
//! One `CancellationToken` cascades: the accept loop stops, every handler
//! observes its child token at the next read, the task tracker drains
//! them, and each handler's permit is released by drop. Tokens in use plus
//! tokens free always equal the configured cap.
//!
//! # Example
//!
//! ```ignore
//! use fleetgate_sources::tcp::{TcpGateway, TcpGatewayConfig};
//!
//! let gateway = TcpGateway::new(config, topics, dedup, publisher, metrics);
//! let health = gateway.health();
//! gateway.run(cancel).await?;
//! ```

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fleetgate_dedup::DedupIndex;
use fleetgate_metrics::{GatewayMetrics, HealthFlag};
use fleetgate_publish::{Publisher, Topics};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::conn::Connection;
use crate::error::TcpGatewayError;

/// TCP gateway configuration
#[derive(Debug, Clone)]
pub struct TcpGatewayConfig {
    /// Bind address (e.g. "0.0.0.0")
    pub address: String,

    /// Listen port
    pub port: u16,

    /// Admission cap on concurrent connections
    pub max_connections: usize,

    /// Bytes read from the socket per read call
    pub read_buffer_size: usize,

    /// Framing buffer cap before the connection is force-closed
    pub max_pending_bytes: usize,

    /// Per-connection idle deadline
    pub idle_timeout: Duration,

    /// Enable TCP_NODELAY on accepted sockets
    pub nodelay: bool,

    /// Enable TCP keepalive on accepted sockets
    pub keepalive: bool,

    /// Close the connection on publish failure instead of dropping the
    /// single message
    pub disconnect_on_publish_error: bool,
}

impl Default for TcpGatewayConfig {
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

impl TcpGatewayConfig {
    /// Create config with custom port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Get the socket address to bind to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }
}

/// TCP ingestion gateway
///
/// Accepts device connections up to the admission cap and runs one
/// connection handler per socket.
pub struct TcpGateway {
    config: TcpGatewayConfig,
    topics: Topics,
    dedup: Arc<DedupIndex>,
    publisher: Arc<dyn Publisher>,
    metrics: Arc<GatewayMetrics>,
    admission: Arc<Semaphore>,
    health: HealthFlag,
}

impl TcpGateway {
    /// Create a new gateway
    pub fn new(
        config: TcpGatewayConfig,
        topics: Topics,
        dedup: Arc<DedupIndex>,
        publisher: Arc<dyn Publisher>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        let admission = Arc::new(Semaphore::new(config.max_connections));
        Self {
            config,
            topics,
            dedup,
            publisher,
            metrics,
            admission,
            health: HealthFlag::new(),
        }
    }

    /// Health handle; healthy while the accept loop runs
    ///
    /// Remains valid after `run()` consumes the gateway.
    pub fn health(&self) -> HealthFlag {
        self.health.clone()
    }

    /// Admission tokens currently free
    pub fn available_permits(&self) -> usize {
        self.admission.available_permits()
    }

    /// Run the gateway
    ///
    /// Binds the configured address and accepts connections until the
    /// cancellation token fires, then drains in-flight handlers before
    /// returning. Only a bind failure is an error.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), TcpGatewayError> {
        let bind_addr = self.config.bind_address();

        let listener =
            TcpListener::bind(&bind_addr)
                .await
                .map_err(|e| TcpGatewayError::Bind {
                    address: bind_addr.clone(),
                    source: e,
                })?;

        self.health.set_healthy(true);

        tracing::info!(
            address = %bind_addr,
            max_connections = self.config.max_connections,
            idle_timeout_secs = self.config.idle_timeout.as_secs(),
            "tcp gateway listening"
        );

        self.accept_loop(listener, cancel).await
    }

    /// Main accept loop
    async fn accept_loop(
        self,
        listener: TcpListener,
        cancel: CancellationToken,
    ) -> Result<(), TcpGatewayError> {
        let handlers = TaskTracker::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                result = listener.accept() => match result {
                    Ok((stream, peer)) => self.admit(stream, peer, &handlers, &cancel),
                    Err(e) => {
                        // Transient accept errors - log and continue
                        tracing::warn!(error = %e, "accept error");
                    }
                }
            }
        }

        self.health.set_healthy(false);

        handlers.close();
        handlers.wait().await;

        tracing::info!("tcp gateway stopped");
        Ok(())
    }

    /// Admit one accepted socket, or close it if the cap is reached
    fn admit(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        handlers: &TaskTracker,
        cancel: &CancellationToken,
    ) {
        let permit = match Arc::clone(&self.admission).try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                self.metrics.connection_rejected();
                tracing::warn!(peer = %peer, "admission cap reached, closing connection");
                drop(stream);
                return;
            }
        };

        self.metrics.connection_opened();
        tracing::debug!(peer = %peer, "connection accepted");

        let conn = Connection::new(
            &self.config,
            peer,
            self.topics.clone(),
            Arc::clone(&self.dedup),
            Arc::clone(&self.publisher),
            Arc::clone(&self.metrics),
        );
        let metrics = Arc::clone(&self.metrics);
        let cancel = cancel.child_token();

        handlers.spawn(async move {
            match conn.run(stream, cancel).await {
                Ok(()) => tracing::debug!(peer = %peer, "connection closed"),
                Err(e) => tracing::warn!(peer = %peer, error = %e, "connection terminated"),
            }
            // The permit is released here and nowhere else
            drop(permit);
            metrics.connection_closed();
        });
    }
}
