//! # Engine Entity Snapshots
//!
//! The entity state the process engine attaches to each runtime event.
//! These are snapshots taken at emission time, not the query read model.
//!
//! ## Clusters
//!
//! - **Process**: `ProcessInstance`, `ProcessDefinition`, `Deployment`,
//!   candidate starters
//! - **Task**: `Task`, `TaskCandidateUser`, `TaskCandidateGroup`
//! - **Variables**: `VariableInstance`
//! - **BPMN**: `BpmnActivity`, `SequenceFlow`, `IntegrationContext`
//!
//! All timestamps are epoch milliseconds.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Activity type reported by the engine for service tasks.
pub const SERVICE_TASK_ACTIVITY_TYPE: &str = "serviceTask";

// =============================================================================
// CLUSTER A: PROCESS
// =============================================================================

/// Lifecycle status of a process instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessInstanceStatus {
    #[default]
    Created,
    Running,
    Suspended,
    Cancelled,
    Completed,
}

impl ProcessInstanceStatus {
    /// Completed and cancelled instances accept no further lifecycle change.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// A process instance as seen by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessInstance {
    pub id: String,
    pub name: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_key: Option<String>,
    pub process_definition_name: Option<String>,
    pub process_definition_version: Option<i32>,
    pub initiator: Option<String>,
    pub business_key: Option<String>,
    pub parent_id: Option<String>,
    pub start_date: Option<i64>,
    pub status: ProcessInstanceStatus,
}

impl ProcessInstance {
    /// Create a snapshot with only the id set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }
}

/// A deployed process definition.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProcessDefinition {
    pub id: String,
    pub key: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: i32,
    pub form_key: Option<String>,
    pub category: Option<String>,
}

/// An application deployment.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Deployment {
    pub id: String,
    pub name: String,
    pub version: i32,
}

/// A user allowed to start instances of a process definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCandidateStarterUser {
    pub process_definition_id: String,
    pub user_id: String,
}

/// A group allowed to start instances of a process definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessCandidateStarterGroup {
    pub process_definition_id: String,
    pub group_id: String,
}

// =============================================================================
// CLUSTER B: TASK
// =============================================================================

/// Lifecycle status of a user task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Created,
    Assigned,
    Suspended,
    Completed,
    Cancelled,
}

impl TaskStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

/// A user task as seen by the engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Task {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub assignee: Option<String>,
    pub owner: Option<String>,
    pub priority: i32,
    pub due_date: Option<i64>,
    pub created_date: Option<i64>,
    pub claimed_date: Option<i64>,
    pub completed_date: Option<i64>,
    pub completed_by: Option<String>,
    pub process_instance_id: Option<String>,
    pub process_definition_id: Option<String>,
    pub process_definition_version: Option<i32>,
    pub business_key: Option<String>,
    pub task_definition_key: Option<String>,
    pub parent_task_id: Option<String>,
    pub form_key: Option<String>,
    pub status: TaskStatus,
}

impl Task {
    /// Create a snapshot with only the id set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Builder-style setter for the owning process instance.
    #[must_use]
    pub fn in_process(mut self, process_instance_id: impl Into<String>) -> Self {
        self.process_instance_id = Some(process_instance_id.into());
        self
    }
}

/// A candidate user link on a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCandidateUser {
    pub task_id: String,
    pub user_id: String,
}

/// A candidate group link on a task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskCandidateGroup {
    pub task_id: String,
    pub group_id: String,
}

// =============================================================================
// CLUSTER C: VARIABLES
// =============================================================================

/// A process or task variable.
///
/// A variable is a task variable iff `task_id` is set.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariableInstance {
    pub name: String,
    #[serde(rename = "type")]
    pub variable_type: String,
    pub value: serde_json::Value,
    pub process_instance_id: Option<String>,
    pub task_id: Option<String>,
}

impl VariableInstance {
    pub fn new(
        name: impl Into<String>,
        variable_type: impl Into<String>,
        value: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            variable_type: variable_type.into(),
            value,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn in_process(mut self, process_instance_id: impl Into<String>) -> Self {
        self.process_instance_id = Some(process_instance_id.into());
        self
    }

    #[must_use]
    pub fn on_task(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    #[must_use]
    pub fn is_task_variable(&self) -> bool {
        self.task_id.is_some()
    }
}

// =============================================================================
// CLUSTER D: BPMN
// =============================================================================

/// A BPMN flow node execution.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BpmnActivity {
    pub element_id: String,
    pub activity_name: Option<String>,
    pub activity_type: Option<String>,
    pub process_instance_id: String,
    pub process_definition_id: Option<String>,
    pub execution_id: String,
}

impl BpmnActivity {
    /// Read-model identity: `processInstanceId:elementId:executionId`.
    #[must_use]
    pub fn activity_id(&self) -> String {
        format!(
            "{}:{}:{}",
            self.process_instance_id, self.element_id, self.execution_id
        )
    }

    #[must_use]
    pub fn is_service_task(&self) -> bool {
        self.activity_type.as_deref() == Some(SERVICE_TASK_ACTIVITY_TYPE)
    }
}

/// A sequence flow taken between two activities.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SequenceFlow {
    pub element_id: String,
    pub source_activity_element_id: Option<String>,
    pub source_activity_name: Option<String>,
    pub source_activity_type: Option<String>,
    pub target_activity_element_id: Option<String>,
    pub target_activity_name: Option<String>,
    pub target_activity_type: Option<String>,
    pub process_instance_id: String,
    pub process_definition_id: Option<String>,
}

/// A connector invocation issued by a service task.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IntegrationContext {
    pub id: String,
    pub process_instance_id: String,
    pub process_definition_id: Option<String>,
    pub execution_id: Option<String>,
    pub business_key: Option<String>,
    /// Element id of the service task that issued the request.
    pub client_id: String,
    pub client_name: Option<String>,
    pub client_type: Option<String>,
    pub connector_type: Option<String>,
    pub in_bound_variables: BTreeMap<String, serde_json::Value>,
    pub out_bound_variables: BTreeMap<String, serde_json::Value>,
    pub error_message: Option<String>,
    pub error_class_name: Option<String>,
}
