//! Dedup index configuration

use serde::Deserialize;

/// Duplicate-suppression sizing
///
/// # Example
///
/// ```toml
/// [dedup]
/// entries_per_device = 1000
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DedupConfig {
    /// Upper bound on remembered counters per device
    /// Default: 1000
    pub entries_per_device: usize,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            entries_per_device: 1000,
        }
    }
}
