//! Configuration for the audit log

use serde::{Deserialize, Serialize};

/// Audit configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Maximum events accepted in one batch
    pub max_batch_size: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1000,
        }
    }
}
