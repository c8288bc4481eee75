//! Configuration for the query projection

use crate::domain::value_objects::TieBreak;
use serde::{Deserialize, Serialize};

/// Projection configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectionConfig {
    /// Maximum events accepted in one batch
    pub max_batch_size: usize,
    /// Ordering of equal-rank events
    pub tie_break: TieBreak,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 1000,
            tie_break: TieBreak::ArrivalOrder,
        }
    }
}
