//! Gateway health
//!
//! Healthy while the acceptor is running. The flag is a cheap clonable
//! handle; whatever serves health checks reads it, the acceptor writes it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared liveness flag for the acceptor
#[derive(Debug, Clone, Default)]
pub struct HealthFlag(Arc<AtomicBool>);

impl HealthFlag {
    /// Create a flag in the unhealthy state
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the gateway healthy or unhealthy
    pub fn set_healthy(&self, healthy: bool) {
        self.0.store(healthy, Ordering::Relaxed);
    }

    /// True while the acceptor is running
    pub fn is_healthy(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}
