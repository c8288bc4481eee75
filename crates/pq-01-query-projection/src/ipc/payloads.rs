//! IPC Payloads for the query projection

use crate::domain::value_objects::BatchOutcome;
use serde::{Deserialize, Serialize};

/// Result of consuming one broker message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    /// Application that emitted the batch (empty if it could not be decoded)
    pub app_name: String,
    /// Whether the batch was applied
    pub success: bool,
    /// Events applied by a handler
    pub handled: usize,
    /// Events without a handler
    pub unhandled: usize,
    /// Error message (if failed)
    pub error: Option<String>,
}

impl BatchResponse {
    pub fn applied(app_name: impl Into<String>, outcome: BatchOutcome) -> Self {
        Self {
            app_name: app_name.into(),
            success: true,
            handled: outcome.handled,
            unhandled: outcome.unhandled,
            error: None,
        }
    }

    pub fn rejected(app_name: impl Into<String>, error: impl ToString) -> Self {
        Self {
            app_name: app_name.into(),
            success: false,
            handled: 0,
            unhandled: 0,
            error: Some(error.to_string()),
        }
    }
}
