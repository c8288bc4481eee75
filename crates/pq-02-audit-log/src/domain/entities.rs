//! Audit entities

use serde::{Deserialize, Serialize};

/// One recorded runtime event.
///
/// Flat and append-only: the envelope is copied field by field and the
/// carried entity is kept as raw JSON so the record survives changes to
/// the engine's entity shapes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEventEntity {
    pub event_id: String,
    /// `SCREAMING_SNAKE_CASE` event kind.
    pub event_type: String,
    pub timestamp: i64,
    pub app_name: Option<String>,
    pub app_version: Option<String>,
    pub service_name: Option<String>,
    pub service_full_name: Option<String>,
    pub service_type: Option<String>,
    pub service_version: Option<String>,
    pub process_instance_id: Option<String>,
    pub process_definition_id: Option<String>,
    pub business_key: Option<String>,
    pub parent_process_instance_id: Option<String>,
    pub sequence_number: Option<i64>,
    /// Identity of the carried entity (task id, variable name, ...).
    pub entity_id: String,
    pub entity: serde_json::Value,
}

/// Summary of a recorded batch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditOutcome {
    pub recorded: usize,
    /// Events skipped because their id was already recorded.
    pub duplicates: usize,
}
