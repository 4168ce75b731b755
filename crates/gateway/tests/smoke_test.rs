//! Smoke tests for the Fleetgate gateway
//!
//! Wires the real components from a parsed configuration - only the Kafka
//! publisher is swapped for the in-memory mock - and verifies data sent
//! through an actual socket reaches the expected topic.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use fleetgate_config::Config;
use fleetgate_dedup::DedupIndex;
use fleetgate_metrics::GatewayMetrics;
use fleetgate_protocol::{DeviceId, encode_frame};
use fleetgate_publish::testing::MockPublisher;
use fleetgate_publish::{Publisher, Topics};
use fleetgate_sources::{TcpGateway, TcpGatewayConfig};
use serde_json::Value;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

async fn find_available_port() -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

#[tokio::test]
async fn test_configured_gateway_end_to_end() {
    let config = Config::from_str(
        r#"
[listener]
address = "127.0.0.1"
max_connections = 10

[dedup]
entries_per_device = 100

[publisher]
device_message_topic = "smoke-messages"
device_event_topic = "smoke-events"
"#,
    )
    .unwrap();

    let port = find_available_port().await;
    let gateway_config = TcpGatewayConfig {
        address: config.listener.address.clone(),
        port,
        max_connections: config.listener.max_connections,
        read_buffer_size: config.listener.read_buffer_size,
        max_pending_bytes: config.listener.max_pending_bytes,
        idle_timeout: config.listener.idle_timeout,
        nodelay: config.listener.nodelay,
        keepalive: config.listener.keepalive,
        disconnect_on_publish_error: config.listener.disconnect_on_publish_error,
    };
    let topics = Topics {
        device_message: config.publisher.device_message_topic.clone(),
        device_event: config.publisher.device_event_topic.clone(),
    };

    let publisher = Arc::new(MockPublisher::new());
    let dedup = Arc::new(DedupIndex::new(config.dedup.entries_per_device));
    let metrics = Arc::new(GatewayMetrics::new().unwrap());

    let gateway = TcpGateway::new(
        gateway_config,
        topics,
        dedup,
        Arc::clone(&publisher) as Arc<dyn Publisher>,
        Arc::clone(&metrics),
    );
    let health = gateway.health();

    let cancel = CancellationToken::new();
    let handle = tokio::spawn(gateway.run(cancel.clone()));

    // Wait for the acceptor to come up
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !health.is_healthy() {
        assert!(tokio::time::Instant::now() < deadline, "gateway did not start");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    // One device message and one device event
    let mut stream = TcpStream::connect(format!("127.0.0.1:{port}"))
        .await
        .expect("should connect");
    stream
        .write_all(&encode_frame(DeviceId::new([1, 2, 3, 4]), 1, 2, &[1, 2, 3]))
        .await
        .unwrap();
    stream
        .write_all(&encode_frame(DeviceId::new([1, 2, 3, 4]), 2, 1, &[9]))
        .await
        .unwrap();

    let wait = tokio::time::Instant::now() + Duration::from_secs(2);
    while publisher.count() < 2 {
        assert!(tokio::time::Instant::now() < wait, "records did not arrive");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let messages = publisher.records_for("smoke-messages");
    assert_eq!(messages.len(), 1);
    let json: Value = serde_json::from_slice(&messages[0].value).unwrap();
    assert_eq!(json["deviceId"], "01-02-03-04");

    let events = publisher.records_for("smoke-events");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].value, vec![9]);

    // Graceful shutdown: acceptor stops, handlers drain, flush succeeds
    cancel.cancel();
    timeout(Duration::from_secs(2), handle)
        .await
        .expect("shutdown should complete")
        .unwrap()
        .unwrap();
    assert!(!health.is_healthy());

    publisher.flush(config.publisher.timeout).await.unwrap();
    assert_eq!(publisher.flush_count(), 1);
}
