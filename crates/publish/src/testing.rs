//! In-memory publisher for tests
//!
//! Records every published record and can be scripted to fail upcoming
//! publishes, which is how the handler's publish-error dispositions are
//! exercised without a broker.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::publisher::{PublishError, Publisher, Record};

/// Publisher test double
#[derive(Debug, Default)]
pub struct MockPublisher {
    records: Mutex<Vec<Record>>,
    fail_remaining: AtomicUsize,
    flushed: AtomicUsize,
}

impl MockPublisher {
    /// Create an empty mock
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` publishes fail with a transient error
    pub fn fail_next(&self, n: usize) {
        self.fail_remaining.store(n, Ordering::SeqCst);
    }

    /// All records published so far, in publish order
    pub fn records(&self) -> Vec<Record> {
        self.records.lock().clone()
    }

    /// Records published to one topic, in publish order
    pub fn records_for(&self, topic: &str) -> Vec<Record> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.topic == topic)
            .cloned()
            .collect()
    }

    /// Number of records published so far
    pub fn count(&self) -> usize {
        self.records.lock().len()
    }

    /// Number of flush calls observed
    pub fn flush_count(&self) -> usize {
        self.flushed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Publisher for MockPublisher {
    async fn publish(&self, record: Record) -> Result<(), PublishError> {
        let remaining = self.fail_remaining.load(Ordering::SeqCst);
        if remaining > 0
            && self
                .fail_remaining
                .compare_exchange(remaining, remaining - 1, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
        {
            return Err(PublishError::Transient {
                topic: record.topic,
                reason: "scripted failure".into(),
            });
        }

        self.records.lock().push(record);
        Ok(())
    }

    async fn flush(&self, _deadline: Duration) -> Result<(), PublishError> {
        self.flushed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
