//! Fleetgate Sources - TCP ingestion front end
//!
//! Accepts long-lived device connections and runs the per-connection
//! pipeline: frame decode, parse, dedup, classify, publish.
//!
//! # Design Principles
//!
//! - **Bounded admission**: a semaphore caps concurrent connections; the
//!   slot is try-acquired before the handler task is spawned and released
//!   exactly once when it exits
//! - **Per-connection tasks**: one task per device connection, sequential
//!   within, so each connection's frames publish in arrival order
//! - **Localized failures**: parse errors, duplicates, unknown types, and
//!   publish failures drop a single frame; framing overflow, I/O errors,
//!   and idle timeouts terminate only their own connection
//! - **Cooperative shutdown**: a `CancellationToken` stops the acceptor,
//!   cancels handlers, and the tracker drains them

mod conn;
mod error;
pub mod tcp;

pub use error::TcpGatewayError;
pub use tcp::{TcpGateway, TcpGatewayConfig};
