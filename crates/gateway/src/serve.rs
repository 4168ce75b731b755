//! Gateway lifecycle
//!
//! Builds the shared components from configuration, runs the acceptor, and
//! drains on shutdown: signal → cancel → acceptor stops → handlers finish
//! and release their admission tokens → publisher flush → exit.

use std::sync::Arc;

use anyhow::{Context, Result};
use fleetgate_config::Config;
use fleetgate_dedup::DedupIndex;
use fleetgate_metrics::GatewayMetrics;
use fleetgate_publish::{KafkaPublisher, KafkaPublisherConfig, Publisher, Topics};
use fleetgate_sources::{TcpGateway, TcpGatewayConfig};
use tokio_util::sync::CancellationToken;

/// Run the gateway until a shutdown signal arrives
pub async fn run(config: Config) -> Result<()> {
    let metrics = Arc::new(GatewayMetrics::new().context("failed to create metrics")?);
    let dedup = Arc::new(DedupIndex::new(config.dedup.entries_per_device));
    let publisher: Arc<dyn Publisher> = Arc::new(
        KafkaPublisher::new(&kafka_config(&config)).context("failed to create kafka publisher")?,
    );

    let gateway = TcpGateway::new(
        gateway_config(&config),
        topics(&config),
        dedup,
        Arc::clone(&publisher),
        metrics,
    );

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("shutdown signal received, stopping gateway");
        signal_cancel.cancel();
    });

    gateway.run(cancel).await?;

    if let Err(e) = publisher.flush(config.publisher.timeout).await {
        tracing::warn!(error = %e, "publisher flush failed during shutdown");
    }

    Ok(())
}

fn gateway_config(config: &Config) -> TcpGatewayConfig {
    let listener = &config.listener;
    TcpGatewayConfig {
        address: listener.address.clone(),
        port: listener.port,
        max_connections: listener.max_connections,
        read_buffer_size: listener.read_buffer_size,
        max_pending_bytes: listener.max_pending_bytes,
        idle_timeout: listener.idle_timeout,
        nodelay: listener.nodelay,
        keepalive: listener.keepalive,
        disconnect_on_publish_error: listener.disconnect_on_publish_error,
    }
}

fn topics(config: &Config) -> Topics {
    Topics {
        device_message: config.publisher.device_message_topic.clone(),
        device_event: config.publisher.device_event_topic.clone(),
    }
}

fn kafka_config(config: &Config) -> KafkaPublisherConfig {
    let publisher = &config.publisher;
    KafkaPublisherConfig {
        brokers: publisher.brokers.clone(),
        client_id: publisher.client_id.clone(),
        acks: publisher.acks.clone(),
        idempotence: publisher.idempotence,
        compression: publisher.compression.clone(),
        timeout: publisher.timeout,
    }
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
