//! Fleetgate Configuration
//!
//! TOML-based configuration loading with sensible defaults. A minimal
//! config should just work - only specify what you need to change.
//!
//! # Parsing
//!
//! Use the `FromStr` trait to parse configuration:
//!
//! ```
//! use fleetgate_config::Config;
//! use std::str::FromStr;
//!
//! let config = Config::from_str("[listener]\nport = 50100").unwrap();
//! ```
//!
//! # Example Minimal Config
//!
//! ```toml
//! [listener]
//! port = 50100
//!
//! [publisher]
//! brokers = "kafka-1:9092,kafka-2:9092"
//! ```
//!
//! See `configs/example.toml` for all available options.

mod dedup;
mod error;
mod listener;
mod logging;
mod publisher;
mod validation;

use std::fs;
use std::path::Path;
use std::str::FromStr;

pub use dedup::DedupConfig;
pub use error::{ConfigError, Result};
pub use listener::ListenerConfig;
pub use logging::LogConfig;
pub use publisher::PublisherConfig;

use serde::Deserialize;

/// Main configuration structure
///
/// All sections are optional with sensible defaults. Configuration is
/// loaded once at startup and immutable during the run.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// TCP listener and per-connection limits
    pub listener: ListenerConfig,

    /// Duplicate-suppression index sizing
    pub dedup: DedupConfig,

    /// Downstream publisher settings
    pub publisher: PublisherConfig,

    /// Logging configuration
    pub log: LogConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, contains invalid TOML, or
    /// fails validation.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&contents)
    }

    fn parse(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        validation::validate_config(self)
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
