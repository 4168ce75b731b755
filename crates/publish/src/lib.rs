//! Fleetgate Publish - Routing and downstream delivery
//!
//! Classifies parsed device messages, projects them into publishable
//! records, and delivers them through the [`Publisher`] capability:
//!
//! - `device-message` types get a structured JSON envelope
//! - `device-event` types publish the raw payload bytes directly
//! - everything else is dropped and counted upstream
//!
//! The production [`KafkaPublisher`] wraps an rdkafka `FutureProducer`;
//! tests use the in-memory [`testing::MockPublisher`].

mod envelope;
mod kafka;
mod publisher;
mod router;
pub mod testing;

pub use envelope::{device_event_record, device_message_record};
pub use kafka::{KafkaPublisher, KafkaPublisherConfig};
pub use publisher::{HEADER_SOURCE, HEADER_VERSION, PublishError, Publisher, Record};
pub use router::{Route, Topics, classify};
