//! Read-model entities
//!
//! The query-side projection of engine state. Each entity is built and
//! updated by the event handlers; nothing here is sent back to the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::{ProcessInstanceStatus, TaskStatus};
use std::collections::BTreeMap;

/// Convert an event timestamp (epoch millis) to a UTC date.
///
/// Out-of-range values clamp to the epoch.
pub fn event_date(timestamp_millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(timestamp_millis).unwrap_or_default()
}

// =============================================================================
// PROCESS
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessInstanceEntity {
    pub id: String,
    pub name: Option<String>,
    pub app_name: Option<String>,
    pub app_version: Option<String>,
    pub service_name: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_key: Option<String>,
    pub process_definition_name: Option<String>,
    pub process_definition_version: Option<i32>,
    pub initiator: Option<String>,
    pub business_key: Option<String>,
    pub parent_id: Option<String>,
    pub status: ProcessInstanceStatus,
    pub start_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub suspended_date: Option<DateTime<Utc>>,
    pub last_modified: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDefinitionEntity {
    pub id: String,
    pub key: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: i32,
    pub form_key: Option<String>,
    pub category: Option<String>,
    pub app_name: Option<String>,
    pub app_version: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationEntity {
    pub id: String,
    pub name: String,
    pub version: i32,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCandidateStarterUserEntity {
    pub process_definition_id: String,
    pub user_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCandidateStarterGroupEntity {
    pub process_definition_id: String,
    pub group_id: String,
}

// =============================================================================
// TASK
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntity {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub owner: Option<String>,
    pub priority: i32,
    pub app_name: Option<String>,
    pub process_instance_id: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_version: Option<i32>,
    pub business_key: Option<String>,
    pub task_definition_key: Option<String>,
    pub parent_task_id: Option<String>,
    pub form_key: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub claimed_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub completed_by: Option<String>,
    /// Milliseconds between creation and completion.
    pub duration: Option<i64>,
    pub last_modified: DateTime<Utc>,
}

impl TaskEntity {
    /// Whether this task is a standalone task (no owning process instance).
    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.process_instance_id.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCandidateUserEntity {
    pub task_id: String,
    pub user_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCandidateGroupEntity {
    pub task_id: String,
    pub group_id: String,
}

// =============================================================================
// VARIABLES
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessVariableEntity {
    pub process_instance_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub variable_type: String,
    pub value: Value,
    pub app_name: Option<String>,
    pub create_time: DateTime<Utc>,
    pub last_updated_time: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskVariableEntity {
    pub task_id: String,
    pub process_instance_id: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub variable_type: String,
    pub value: Value,
    pub app_name: Option<String>,
    pub create_time: DateTime<Utc>,
    pub last_updated_time: DateTime<Utc>,
}

// =============================================================================
// BPMN
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BpmnActivityStatus {
    Started,
    Completed,
    Cancelled,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BpmnActivityEntity {
    /// `processInstanceId:elementId:executionId`
    pub id: String,
    pub element_id: String,
    pub activity_name: Option<String>,
    pub activity_type: Option<String>,
    pub process_instance_id: String,
    pub process_definition_id: Option<String>,
    pub execution_id: String,
    pub status: BpmnActivityStatus,
    pub started_date: Option<DateTime<Utc>>,
    pub completed_date: Option<DateTime<Utc>>,
    pub cancelled_date: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BpmnSequenceFlowEntity {
    /// Id of the event that reported the flow.
    pub id: String,
    pub element_id: String,
    pub source_activity_element_id: Option<String>,
    pub source_activity_name: Option<String>,
    pub source_activity_type: Option<String>,
    pub target_activity_element_id: Option<String>,
    pub target_activity_name: Option<String>,
    pub target_activity_type: Option<String>,
    pub process_instance_id: String,
    pub process_definition_id: Option<String>,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IntegrationContextStatus {
    IntegrationRequested,
    IntegrationResultReceived,
    IntegrationErrorReceived,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationContextEntity {
    pub id: String,
    pub process_instance_id: String,
    pub process_definition_id: Option<String>,
    pub execution_id: Option<String>,
    pub business_key: Option<String>,
    pub client_id: String,
    pub client_name: Option<String>,
    pub client_type: Option<String>,
    pub connector_type: Option<String>,
    pub status: IntegrationContextStatus,
    pub in_bound_variables: BTreeMap<String, Value>,
    pub out_bound_variables: BTreeMap<String, Value>,
    pub request_date: Option<DateTime<Utc>>,
    pub result_date: Option<DateTime<Utc>>,
    pub error_date: Option<DateTime<Utc>>,
    pub error_message: Option<String>,
    pub error_class_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_date_from_millis() {
        let date = event_date(1_700_000_000_123);
        assert_eq!(date.timestamp_millis(), 1_700_000_000_123);
    }

    #[test]
    fn test_event_date_out_of_range_clamps_to_epoch() {
        assert_eq!(event_date(i64::MAX).timestamp_millis(), 0);
    }

    #[test]
    fn test_activity_status_wire_names() {
        let encoded = serde_json::to_value(BpmnActivityStatus::Cancelled).unwrap();
        assert_eq!(encoded, serde_json::json!("CANCELLED"));

        let encoded =
            serde_json::to_value(IntegrationContextStatus::IntegrationErrorReceived).unwrap();
        assert_eq!(encoded, serde_json::json!("INTEGRATION_ERROR_RECEIVED"));
    }
}
