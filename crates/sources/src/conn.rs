//! Connection handler
//!
//! One handler per accepted socket, sequential within the connection:
//! read a chunk, feed the frame decoder, then run each complete frame
//! through parse → dedup → classify → publish. Per-frame failures drop the
//! frame and keep the connection; framing overflow, I/O errors, and the
//! idle deadline tear the connection down.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use chrono::Utc;
use fleetgate_dedup::DedupIndex;
use fleetgate_metrics::GatewayMetrics;
use fleetgate_protocol::{FrameDecoder, parse_message};
use fleetgate_publish::{
    PublishError, Publisher, Record, Route, Topics, classify, device_event_record,
    device_message_record,
};
use socket2::{SockRef, TcpKeepalive};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::TcpGatewayError;
use crate::tcp::TcpGatewayConfig;

/// Per-connection state and pipeline
pub(crate) struct Connection {
    peer: SocketAddr,
    decoder: FrameDecoder,
    read_buffer_size: usize,
    idle_timeout: Duration,
    nodelay: bool,
    keepalive: bool,
    disconnect_on_publish_error: bool,
    topics: Topics,
    dedup: Arc<DedupIndex>,
    publisher: Arc<dyn Publisher>,
    metrics: Arc<GatewayMetrics>,
}

impl Connection {
    pub(crate) fn new(
        config: &TcpGatewayConfig,
        peer: SocketAddr,
        topics: Topics,
        dedup: Arc<DedupIndex>,
        publisher: Arc<dyn Publisher>,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            peer,
            decoder: FrameDecoder::new(config.max_pending_bytes),
            read_buffer_size: config.read_buffer_size,
            idle_timeout: config.idle_timeout,
            nodelay: config.nodelay,
            keepalive: config.keepalive,
            disconnect_on_publish_error: config.disconnect_on_publish_error,
            topics,
            dedup,
            publisher,
            metrics,
        }
    }

    /// Run the read loop until the peer closes, a fatal error occurs, or
    /// the gateway shuts down
    pub(crate) async fn run(
        mut self,
        mut stream: TcpStream,
        cancel: CancellationToken,
    ) -> Result<(), TcpGatewayError> {
        self.configure_socket(&stream);

        let mut chunk = BytesMut::with_capacity(self.read_buffer_size);

        loop {
            chunk.clear();

            let read = tokio::select! {
                _ = cancel.cancelled() => return Ok(()),
                read = timeout(self.idle_timeout, stream.read_buf(&mut chunk)) => read,
            };

            match read {
                // Peer closed
                Ok(Ok(0)) => return Ok(()),
                Ok(Ok(_)) => {
                    self.decoder.extend(&chunk)?;
                    while let Some(frame) = self.decoder.next_frame() {
                        self.process_frame(&frame).await?;
                    }
                }
                Ok(Err(e)) => return Err(e.into()),
                Err(_) => return Err(TcpGatewayError::IdleTimeout(self.idle_timeout)),
            }
        }
    }

    /// Dispose of one complete frame
    ///
    /// Every parse failure, duplicate, unknown type, and publish error is
    /// absorbed here; the only error this returns is a publish failure when
    /// the connection is configured to disconnect on those.
    async fn process_frame(&self, frame: &[u8]) -> Result<(), TcpGatewayError> {
        let started = Instant::now();

        let msg = match parse_message(frame) {
            Ok(msg) => msg,
            Err(e) => {
                self.metrics.record_invalid(e.reason());
                tracing::debug!(peer = %self.peer, error = %e, "dropping unparseable frame");
                return Ok(());
            }
        };
        let received_at = Utc::now();

        if !self.dedup.observe(msg.device_id, msg.counter).is_fresh() {
            self.metrics.duplicate_messages_rejected.inc();
            tracing::info!(
                peer = %self.peer,
                device = %msg.device_id,
                counter = msg.counter,
                "duplicate message dropped"
            );
            self.metrics
                .observe_processing(msg.message_type, started.elapsed().as_secs_f64());
            return Ok(());
        }

        let correlation_id = Uuid::new_v4().to_string();

        let delivery = match classify(msg.message_type) {
            Route::DeviceMessage => {
                let topic = &self.topics.device_message;
                let record = device_message_record(&msg, topic, received_at, &correlation_id);
                let delivery = self.deliver(topic, record).await;
                if delivery.is_ok() {
                    self.metrics.device_messages_processed.inc();
                }
                delivery
            }
            Route::DeviceEvent => {
                let topic = &self.topics.device_event;
                let record = device_event_record(&msg, topic, &correlation_id);
                let delivery = self.deliver(topic, Ok(record)).await;
                if delivery.is_ok() {
                    self.metrics.device_events_processed.inc();
                }
                delivery
            }
            Route::Ignore => {
                self.metrics.record_invalid("unknown_message_type");
                tracing::warn!(
                    peer = %self.peer,
                    device = %msg.device_id,
                    message_type = msg.message_type,
                    "unknown message type dropped"
                );
                Ok(())
            }
        };

        self.metrics
            .observe_processing(msg.message_type, started.elapsed().as_secs_f64());

        match delivery {
            Err(e) if self.disconnect_on_publish_error => Err(e.into()),
            // Default disposition: the message is already logged, counted,
            // and dropped; the device stays connected
            _ => Ok(()),
        }
    }

    /// Publish one record, recording latency and failures
    async fn deliver(
        &self,
        topic: &str,
        record: Result<Record, PublishError>,
    ) -> Result<(), PublishError> {
        let result = match record {
            Ok(record) => {
                let started = Instant::now();
                let result = self.publisher.publish(record).await;
                self.metrics
                    .observe_publish(topic, started.elapsed().as_secs_f64());
                result
            }
            Err(e) => Err(e),
        };

        if let Err(ref e) = result {
            self.metrics.record_publish_error(topic, e.label());
            tracing::warn!(
                peer = %self.peer,
                topic,
                error = %e,
                "publish failed, dropping message"
            );
        }

        result
    }

    /// Apply socket options; failures are non-fatal
    fn configure_socket(&self, stream: &TcpStream) {
        if self.nodelay
            && let Err(e) = stream.set_nodelay(true)
        {
            tracing::debug!(peer = %self.peer, error = %e, "failed to set TCP_NODELAY");
        }

        if self.keepalive {
            let sock = SockRef::from(stream);
            let keepalive = TcpKeepalive::new()
                .with_time(Duration::from_secs(60))
                .with_interval(Duration::from_secs(10));

            if let Err(e) = sock.set_tcp_keepalive(&keepalive) {
                tracing::debug!(peer = %self.peer, error = %e, "failed to set TCP keepalive");
            }
        }
    }
}
