//! # Runtime Configuration
//!
//! Aggregates the subsystem configs with the runtime's own settings. Every
//! value has a default and can be overridden from the environment:
//!
//! | Variable | Setting |
//! |---|---|
//! | `PQ_LOG_LEVEL` (else `RUST_LOG`) | tracing filter directive |
//! | `PQ_BUS_CAPACITY` | event bus channel capacity |
//! | `PQ_APP_NAMES` | comma-separated app names to consume (empty = all) |
//! | `PQ_MAX_BATCH_SIZE` | batch limit for both consumers |
//! | `PQ_TIE_BREAK` | `arrival_order` or `timestamp` |
//! | `PQ_REPLAY_FILE` | JSON array of batches applied at startup |

use pq_01_query_projection::{ProjectionConfig, TieBreak};
use pq_02_audit_log::AuditConfig;
use shared_bus::DEFAULT_CHANNEL_CAPACITY;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Query projection configuration.
    pub projection: ProjectionConfig,
    /// Audit log configuration.
    pub audit: AuditConfig,
    /// Event bus channel capacity.
    pub bus_capacity: usize,
    /// Applications whose batches are consumed; empty consumes all.
    pub app_names: Vec<String>,
    /// Batches to publish once consumers are running.
    pub replay_file: Option<PathBuf>,
    /// Tracing filter directive.
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            projection: ProjectionConfig::default(),
            audit: AuditConfig::default(),
            bus_capacity: DEFAULT_CHANNEL_CAPACITY,
            app_names: Vec::new(),
            replay_file: None,
            log_level: "info".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup("PQ_LOG_LEVEL").or_else(|| lookup("RUST_LOG")) {
            config.log_level = level;
        }

        if let Some(value) = lookup("PQ_BUS_CAPACITY") {
            config.bus_capacity = parse("PQ_BUS_CAPACITY", value)?;
            if config.bus_capacity == 0 {
                return Err(ConfigError::InvalidValue {
                    var: "PQ_BUS_CAPACITY",
                    value: "0".to_string(),
                });
            }
        }

        if let Some(value) = lookup("PQ_APP_NAMES") {
            config.app_names = value
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some(value) = lookup("PQ_MAX_BATCH_SIZE") {
            let max: usize = parse("PQ_MAX_BATCH_SIZE", value)?;
            config.projection.max_batch_size = max;
            config.audit.max_batch_size = max;
        }

        if let Some(value) = lookup("PQ_TIE_BREAK") {
            config.projection.tie_break = match value.as_str() {
                "arrival_order" => TieBreak::ArrivalOrder,
                "timestamp" => TieBreak::Timestamp,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: "PQ_TIE_BREAK",
                        value,
                    })
                }
            };
        }

        config.replay_file = lookup("PQ_REPLAY_FILE").map(PathBuf::from);

        Ok(config)
    }
}

fn parse<T: FromStr>(var: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { var, value })
}
