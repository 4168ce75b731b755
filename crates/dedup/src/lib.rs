//! Fleetgate Dedup - Per-device duplicate suppression
//!
//! In-memory index from device id to the set of recently observed message
//! counters. Lives for the lifetime of the process; never persisted and
//! never coordinated across gateways.

mod index;

pub use index::{DEFAULT_ENTRIES_PER_DEVICE, DedupIndex, Observation};
