//! IPC Payloads for the audit log

use crate::domain::entities::AuditOutcome;
use serde::{Deserialize, Serialize};

/// Result of auditing one broker message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    pub app_name: String,
    pub success: bool,
    pub recorded: usize,
    pub duplicates: usize,
    pub error: Option<String>,
}

impl AuditResponse {
    pub fn recorded(app_name: impl Into<String>, outcome: AuditOutcome) -> Self {
        Self {
            app_name: app_name.into(),
            success: true,
            recorded: outcome.recorded,
            duplicates: outcome.duplicates,
            error: None,
        }
    }

    pub fn rejected(app_name: impl Into<String>, error: impl ToString) -> Self {
        Self {
            app_name: app_name.into(),
            success: false,
            recorded: 0,
            duplicates: 0,
            error: Some(error.to_string()),
        }
    }
}
