//! # Runtime Events
//!
//! Defines every event kind the process engine emits and the envelope that
//! carries it across the broker.
//!
//! ## Wire Format
//!
//! ```text
//! {
//!   "id": "...", "timestamp": 1700000000000, "appName": "...", ...,
//!   "payload": { "eventType": "TASK_CREATED", "entity": { ... } }
//! }
//! ```

use crate::entities::{
    BpmnActivity, Deployment, IntegrationContext, ProcessCandidateStarterGroup,
    ProcessCandidateStarterUser, ProcessDefinition, ProcessInstance, SequenceFlow, Task,
    TaskCandidateGroup, TaskCandidateUser, VariableInstance,
};
use crate::errors::EventModelError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Fieldless mirror of [`EventPayload`], one variant per event type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    // Process lifecycle
    ProcessCreated,
    ProcessStarted,
    ProcessUpdated,
    ProcessSuspended,
    ProcessResumed,
    ProcessCompleted,
    ProcessCancelled,
    ProcessDeleted,
    // Deployment
    ProcessDeployed,
    ApplicationDeployed,
    // Process candidate starters
    ProcessCandidateStarterUserAdded,
    ProcessCandidateStarterUserRemoved,
    ProcessCandidateStarterGroupAdded,
    ProcessCandidateStarterGroupRemoved,
    // Task lifecycle
    TaskCreated,
    TaskAssigned,
    TaskUpdated,
    TaskActivated,
    TaskSuspended,
    TaskCompleted,
    TaskCancelled,
    // Task candidates
    TaskCandidateUserAdded,
    TaskCandidateUserRemoved,
    TaskCandidateGroupAdded,
    TaskCandidateGroupRemoved,
    // Variables
    VariableCreated,
    VariableUpdated,
    VariableDeleted,
    // BPMN
    ActivityStarted,
    ActivityCompleted,
    ActivityCancelled,
    ActivitySignalReceived,
    SequenceFlowTaken,
    // Integration
    IntegrationRequested,
    IntegrationResultReceived,
    IntegrationErrorReceived,
}

impl EventKind {
    /// Every event kind, in declaration order.
    pub const ALL: [EventKind; 36] = [
        Self::ProcessCreated,
        Self::ProcessStarted,
        Self::ProcessUpdated,
        Self::ProcessSuspended,
        Self::ProcessResumed,
        Self::ProcessCompleted,
        Self::ProcessCancelled,
        Self::ProcessDeleted,
        Self::ProcessDeployed,
        Self::ApplicationDeployed,
        Self::ProcessCandidateStarterUserAdded,
        Self::ProcessCandidateStarterUserRemoved,
        Self::ProcessCandidateStarterGroupAdded,
        Self::ProcessCandidateStarterGroupRemoved,
        Self::TaskCreated,
        Self::TaskAssigned,
        Self::TaskUpdated,
        Self::TaskActivated,
        Self::TaskSuspended,
        Self::TaskCompleted,
        Self::TaskCancelled,
        Self::TaskCandidateUserAdded,
        Self::TaskCandidateUserRemoved,
        Self::TaskCandidateGroupAdded,
        Self::TaskCandidateGroupRemoved,
        Self::VariableCreated,
        Self::VariableUpdated,
        Self::VariableDeleted,
        Self::ActivityStarted,
        Self::ActivityCompleted,
        Self::ActivityCancelled,
        Self::ActivitySignalReceived,
        Self::SequenceFlowTaken,
        Self::IntegrationRequested,
        Self::IntegrationResultReceived,
        Self::IntegrationErrorReceived,
    ];

    /// The wire name (`eventType`) of this kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ProcessCreated => "PROCESS_CREATED",
            Self::ProcessStarted => "PROCESS_STARTED",
            Self::ProcessUpdated => "PROCESS_UPDATED",
            Self::ProcessSuspended => "PROCESS_SUSPENDED",
            Self::ProcessResumed => "PROCESS_RESUMED",
            Self::ProcessCompleted => "PROCESS_COMPLETED",
            Self::ProcessCancelled => "PROCESS_CANCELLED",
            Self::ProcessDeleted => "PROCESS_DELETED",
            Self::ProcessDeployed => "PROCESS_DEPLOYED",
            Self::ApplicationDeployed => "APPLICATION_DEPLOYED",
            Self::ProcessCandidateStarterUserAdded => "PROCESS_CANDIDATE_STARTER_USER_ADDED",
            Self::ProcessCandidateStarterUserRemoved => "PROCESS_CANDIDATE_STARTER_USER_REMOVED",
            Self::ProcessCandidateStarterGroupAdded => "PROCESS_CANDIDATE_STARTER_GROUP_ADDED",
            Self::ProcessCandidateStarterGroupRemoved => "PROCESS_CANDIDATE_STARTER_GROUP_REMOVED",
            Self::TaskCreated => "TASK_CREATED",
            Self::TaskAssigned => "TASK_ASSIGNED",
            Self::TaskUpdated => "TASK_UPDATED",
            Self::TaskActivated => "TASK_ACTIVATED",
            Self::TaskSuspended => "TASK_SUSPENDED",
            Self::TaskCompleted => "TASK_COMPLETED",
            Self::TaskCancelled => "TASK_CANCELLED",
            Self::TaskCandidateUserAdded => "TASK_CANDIDATE_USER_ADDED",
            Self::TaskCandidateUserRemoved => "TASK_CANDIDATE_USER_REMOVED",
            Self::TaskCandidateGroupAdded => "TASK_CANDIDATE_GROUP_ADDED",
            Self::TaskCandidateGroupRemoved => "TASK_CANDIDATE_GROUP_REMOVED",
            Self::VariableCreated => "VARIABLE_CREATED",
            Self::VariableUpdated => "VARIABLE_UPDATED",
            Self::VariableDeleted => "VARIABLE_DELETED",
            Self::ActivityStarted => "ACTIVITY_STARTED",
            Self::ActivityCompleted => "ACTIVITY_COMPLETED",
            Self::ActivityCancelled => "ACTIVITY_CANCELLED",
            Self::ActivitySignalReceived => "ACTIVITY_SIGNAL_RECEIVED",
            Self::SequenceFlowTaken => "SEQUENCE_FLOW_TAKEN",
            Self::IntegrationRequested => "INTEGRATION_REQUESTED",
            Self::IntegrationResultReceived => "INTEGRATION_RESULT_RECEIVED",
            Self::IntegrationErrorReceived => "INTEGRATION_ERROR_RECEIVED",
        }
    }

    /// Task lifecycle and task candidate events.
    #[must_use]
    pub fn is_task_event(self) -> bool {
        matches!(
            self,
            Self::TaskCreated
                | Self::TaskAssigned
                | Self::TaskUpdated
                | Self::TaskActivated
                | Self::TaskSuspended
                | Self::TaskCompleted
                | Self::TaskCancelled
                | Self::TaskCandidateUserAdded
                | Self::TaskCandidateUserRemoved
                | Self::TaskCandidateGroupAdded
                | Self::TaskCandidateGroupRemoved
        )
    }

    #[must_use]
    pub fn is_variable_event(self) -> bool {
        matches!(
            self,
            Self::VariableCreated | Self::VariableUpdated | Self::VariableDeleted
        )
    }

    /// BPMN activity events (sequence flows are not activities).
    #[must_use]
    pub fn is_activity_event(self) -> bool {
        matches!(
            self,
            Self::ActivityStarted
                | Self::ActivityCompleted
                | Self::ActivityCancelled
                | Self::ActivitySignalReceived
        )
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = EventModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EventModelError::UnknownEventType(s.to_string()))
    }
}

/// Event body: the event type tag plus the entity snapshot it carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "eventType", content = "entity", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventPayload {
    ProcessCreated(ProcessInstance),
    ProcessStarted(ProcessInstance),
    ProcessUpdated(ProcessInstance),
    ProcessSuspended(ProcessInstance),
    ProcessResumed(ProcessInstance),
    ProcessCompleted(ProcessInstance),
    ProcessCancelled(ProcessInstance),
    ProcessDeleted(ProcessInstance),
    ProcessDeployed(ProcessDefinition),
    ApplicationDeployed(Deployment),
    ProcessCandidateStarterUserAdded(ProcessCandidateStarterUser),
    ProcessCandidateStarterUserRemoved(ProcessCandidateStarterUser),
    ProcessCandidateStarterGroupAdded(ProcessCandidateStarterGroup),
    ProcessCandidateStarterGroupRemoved(ProcessCandidateStarterGroup),
    TaskCreated(Task),
    TaskAssigned(Task),
    TaskUpdated(Task),
    TaskActivated(Task),
    TaskSuspended(Task),
    TaskCompleted(Task),
    TaskCancelled(Task),
    TaskCandidateUserAdded(TaskCandidateUser),
    TaskCandidateUserRemoved(TaskCandidateUser),
    TaskCandidateGroupAdded(TaskCandidateGroup),
    TaskCandidateGroupRemoved(TaskCandidateGroup),
    VariableCreated(VariableInstance),
    VariableUpdated(VariableInstance),
    VariableDeleted(VariableInstance),
    ActivityStarted(BpmnActivity),
    ActivityCompleted(BpmnActivity),
    ActivityCancelled(BpmnActivity),
    ActivitySignalReceived(BpmnActivity),
    SequenceFlowTaken(SequenceFlow),
    IntegrationRequested(IntegrationContext),
    IntegrationResultReceived(IntegrationContext),
    IntegrationErrorReceived(IntegrationContext),
}

impl EventPayload {
    #[must_use]
    pub fn kind(&self) -> EventKind {
        match self {
            Self::ProcessCreated(_) => EventKind::ProcessCreated,
            Self::ProcessStarted(_) => EventKind::ProcessStarted,
            Self::ProcessUpdated(_) => EventKind::ProcessUpdated,
            Self::ProcessSuspended(_) => EventKind::ProcessSuspended,
            Self::ProcessResumed(_) => EventKind::ProcessResumed,
            Self::ProcessCompleted(_) => EventKind::ProcessCompleted,
            Self::ProcessCancelled(_) => EventKind::ProcessCancelled,
            Self::ProcessDeleted(_) => EventKind::ProcessDeleted,
            Self::ProcessDeployed(_) => EventKind::ProcessDeployed,
            Self::ApplicationDeployed(_) => EventKind::ApplicationDeployed,
            Self::ProcessCandidateStarterUserAdded(_) => EventKind::ProcessCandidateStarterUserAdded,
            Self::ProcessCandidateStarterUserRemoved(_) => {
                EventKind::ProcessCandidateStarterUserRemoved
            }
            Self::ProcessCandidateStarterGroupAdded(_) => {
                EventKind::ProcessCandidateStarterGroupAdded
            }
            Self::ProcessCandidateStarterGroupRemoved(_) => {
                EventKind::ProcessCandidateStarterGroupRemoved
            }
            Self::TaskCreated(_) => EventKind::TaskCreated,
            Self::TaskAssigned(_) => EventKind::TaskAssigned,
            Self::TaskUpdated(_) => EventKind::TaskUpdated,
            Self::TaskActivated(_) => EventKind::TaskActivated,
            Self::TaskSuspended(_) => EventKind::TaskSuspended,
            Self::TaskCompleted(_) => EventKind::TaskCompleted,
            Self::TaskCancelled(_) => EventKind::TaskCancelled,
            Self::TaskCandidateUserAdded(_) => EventKind::TaskCandidateUserAdded,
            Self::TaskCandidateUserRemoved(_) => EventKind::TaskCandidateUserRemoved,
            Self::TaskCandidateGroupAdded(_) => EventKind::TaskCandidateGroupAdded,
            Self::TaskCandidateGroupRemoved(_) => EventKind::TaskCandidateGroupRemoved,
            Self::VariableCreated(_) => EventKind::VariableCreated,
            Self::VariableUpdated(_) => EventKind::VariableUpdated,
            Self::VariableDeleted(_) => EventKind::VariableDeleted,
            Self::ActivityStarted(_) => EventKind::ActivityStarted,
            Self::ActivityCompleted(_) => EventKind::ActivityCompleted,
            Self::ActivityCancelled(_) => EventKind::ActivityCancelled,
            Self::ActivitySignalReceived(_) => EventKind::ActivitySignalReceived,
            Self::SequenceFlowTaken(_) => EventKind::SequenceFlowTaken,
            Self::IntegrationRequested(_) => EventKind::IntegrationRequested,
            Self::IntegrationResultReceived(_) => EventKind::IntegrationResultReceived,
            Self::IntegrationErrorReceived(_) => EventKind::IntegrationErrorReceived,
        }
    }

    /// Process instance the carried entity belongs to, if any.
    #[must_use]
    pub fn process_instance_id(&self) -> Option<&str> {
        match self {
            Self::ProcessCreated(p)
            | Self::ProcessStarted(p)
            | Self::ProcessUpdated(p)
            | Self::ProcessSuspended(p)
            | Self::ProcessResumed(p)
            | Self::ProcessCompleted(p)
            | Self::ProcessCancelled(p)
            | Self::ProcessDeleted(p) => Some(p.id.as_str()),
            Self::TaskCreated(t)
            | Self::TaskAssigned(t)
            | Self::TaskUpdated(t)
            | Self::TaskActivated(t)
            | Self::TaskSuspended(t)
            | Self::TaskCompleted(t)
            | Self::TaskCancelled(t) => t.process_instance_id.as_deref(),
            Self::VariableCreated(v) | Self::VariableUpdated(v) | Self::VariableDeleted(v) => {
                v.process_instance_id.as_deref()
            }
            Self::ActivityStarted(a)
            | Self::ActivityCompleted(a)
            | Self::ActivityCancelled(a)
            | Self::ActivitySignalReceived(a) => Some(a.process_instance_id.as_str()),
            Self::SequenceFlowTaken(s) => Some(s.process_instance_id.as_str()),
            Self::IntegrationRequested(i)
            | Self::IntegrationResultReceived(i)
            | Self::IntegrationErrorReceived(i) => Some(i.process_instance_id.as_str()),
            Self::ProcessDeployed(_)
            | Self::ApplicationDeployed(_)
            | Self::ProcessCandidateStarterUserAdded(_)
            | Self::ProcessCandidateStarterUserRemoved(_)
            | Self::ProcessCandidateStarterGroupAdded(_)
            | Self::ProcessCandidateStarterGroupRemoved(_)
            | Self::TaskCandidateUserAdded(_)
            | Self::TaskCandidateUserRemoved(_)
            | Self::TaskCandidateGroupAdded(_)
            | Self::TaskCandidateGroupRemoved(_) => None,
        }
    }

    /// Identifier of the carried entity, used for audit records and logs.
    #[must_use]
    pub fn entity_id(&self) -> String {
        match self {
            Self::ProcessCreated(p)
            | Self::ProcessStarted(p)
            | Self::ProcessUpdated(p)
            | Self::ProcessSuspended(p)
            | Self::ProcessResumed(p)
            | Self::ProcessCompleted(p)
            | Self::ProcessCancelled(p)
            | Self::ProcessDeleted(p) => p.id.clone(),
            Self::ProcessDeployed(d) => d.id.clone(),
            Self::ApplicationDeployed(d) => d.id.clone(),
            Self::ProcessCandidateStarterUserAdded(s)
            | Self::ProcessCandidateStarterUserRemoved(s) => {
                format!("{}:{}", s.process_definition_id, s.user_id)
            }
            Self::ProcessCandidateStarterGroupAdded(s)
            | Self::ProcessCandidateStarterGroupRemoved(s) => {
                format!("{}:{}", s.process_definition_id, s.group_id)
            }
            Self::TaskCreated(t)
            | Self::TaskAssigned(t)
            | Self::TaskUpdated(t)
            | Self::TaskActivated(t)
            | Self::TaskSuspended(t)
            | Self::TaskCompleted(t)
            | Self::TaskCancelled(t) => t.id.clone(),
            Self::TaskCandidateUserAdded(c) | Self::TaskCandidateUserRemoved(c) => {
                format!("{}:{}", c.task_id, c.user_id)
            }
            Self::TaskCandidateGroupAdded(c) | Self::TaskCandidateGroupRemoved(c) => {
                format!("{}:{}", c.task_id, c.group_id)
            }
            Self::VariableCreated(v) | Self::VariableUpdated(v) | Self::VariableDeleted(v) => {
                v.name.clone()
            }
            Self::ActivityStarted(a)
            | Self::ActivityCompleted(a)
            | Self::ActivityCancelled(a)
            | Self::ActivitySignalReceived(a) => a.element_id.clone(),
            Self::SequenceFlowTaken(s) => s.element_id.clone(),
            Self::IntegrationRequested(i)
            | Self::IntegrationResultReceived(i)
            | Self::IntegrationErrorReceived(i) => i.id.clone(),
        }
    }
}

/// A single runtime event with its delivery envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeEvent {
    /// Unique event id.
    pub id: String,
    /// Emission time (epoch millis).
    pub timestamp: i64,
    #[serde(default)]
    pub app_name: Option<String>,
    #[serde(default)]
    pub app_version: Option<String>,
    #[serde(default)]
    pub service_name: Option<String>,
    #[serde(default)]
    pub service_full_name: Option<String>,
    #[serde(default)]
    pub service_type: Option<String>,
    #[serde(default)]
    pub service_version: Option<String>,
    #[serde(default)]
    pub process_instance_id: Option<String>,
    #[serde(default)]
    pub process_definition_id: Option<String>,
    #[serde(default)]
    pub business_key: Option<String>,
    #[serde(default)]
    pub parent_process_instance_id: Option<String>,
    #[serde(default)]
    pub sequence_number: Option<i64>,
    pub payload: EventPayload,
}

impl RuntimeEvent {
    /// Wrap a payload in a fresh envelope.
    ///
    /// The envelope's process instance id is taken from the payload entity.
    pub fn new(payload: EventPayload) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().timestamp_millis(),
            app_name: None,
            app_version: None,
            service_name: None,
            service_full_name: None,
            service_type: None,
            service_version: None,
            process_instance_id: payload.process_instance_id().map(str::to_string),
            process_definition_id: None,
            business_key: None,
            parent_process_instance_id: None,
            sequence_number: None,
            payload,
        }
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_app(mut self, app_name: impl Into<String>) -> Self {
        self.app_name = Some(app_name.into());
        self
    }

    #[must_use]
    pub fn with_service(mut self, service_name: impl Into<String>) -> Self {
        self.service_name = Some(service_name.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }
}

/// One broker message: the events a runtime bundle flushed together.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBatch {
    pub app_name: String,
    pub events: Vec<RuntimeEvent>,
}

impl EventBatch {
    pub fn new(app_name: impl Into<String>, events: Vec<RuntimeEvent>) -> Self {
        Self {
            app_name: app_name.into(),
            events,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Decode a batch from its JSON wire form.
    pub fn from_json(bytes: &[u8]) -> Result<Self, EventModelError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn to_json(&self) -> Result<Vec<u8>, EventModelError> {
        Ok(serde_json::to_vec(self)?)
    }
}
