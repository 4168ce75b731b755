//! Deduplication index
//!
//! # Design
//!
//! A `DashMap` keyed by device id with a mutex around each device's
//! counter set: observations for the same device serialize on that
//! per-entry lock, which makes the lookup/insert pair atomic, while
//! observations for different devices proceed in parallel. Critical
//! sections are short and never suspend.
//!
//! Eviction is smallest-counter-first. Counters are monotone per device, so
//! this approximates oldest-first without tracking timestamps. A counter
//! that re-appears after eviction is accepted as fresh again; a device that
//! wraps its 16-bit counter inside the retained window will have its
//! post-wrap counters evicted first.

use std::collections::BTreeSet;

use dashmap::DashMap;
use fleetgate_protocol::DeviceId;
use parking_lot::Mutex;

/// Default cap on remembered counters per device
pub const DEFAULT_ENTRIES_PER_DEVICE: usize = 1000;

/// Outcome of observing a (device, counter) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// First sighting within the retained window; the counter was recorded
    Fresh,

    /// Counter already present; state unchanged
    Duplicate,
}

impl Observation {
    /// True if the message should continue through the pipeline
    #[inline]
    pub fn is_fresh(self) -> bool {
        matches!(self, Self::Fresh)
    }
}

/// Concurrent map from device id to recently observed counters
#[derive(Debug)]
pub struct DedupIndex {
    devices: DashMap<DeviceId, Mutex<BTreeSet<u16>>>,
    entries_per_device: usize,
}

impl DedupIndex {
    /// Create an index with the given per-device cap
    ///
    /// The cap is clamped to at least 1.
    pub fn new(entries_per_device: usize) -> Self {
        Self {
            devices: DashMap::new(),
            entries_per_device: entries_per_device.max(1),
        }
    }

    /// Observe a counter for a device
    ///
    /// Records the counter and returns [`Observation::Fresh`], or returns
    /// [`Observation::Duplicate`] leaving state untouched. On overflow the
    /// numerically smallest counters are evicted until the cap holds.
    pub fn observe(&self, device_id: DeviceId, counter: u16) -> Observation {
        let device = self.devices.entry(device_id).or_default().downgrade();
        let mut counters = device.lock();

        if !counters.insert(counter) {
            return Observation::Duplicate;
        }

        while counters.len() > self.entries_per_device {
            counters.pop_first();
        }

        Observation::Fresh
    }

    /// Number of counters currently retained for a device
    pub fn entries(&self, device_id: &DeviceId) -> usize {
        self.devices
            .get(device_id)
            .map_or(0, |counters| counters.lock().len())
    }

    /// Number of devices currently tracked
    pub fn devices(&self) -> usize {
        self.devices.len()
    }
}

impl Default for DedupIndex {
    fn default() -> Self {
        Self::new(DEFAULT_ENTRIES_PER_DEVICE)
    }
}
