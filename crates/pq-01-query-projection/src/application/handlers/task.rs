//! Task lifecycle

use super::{unexpected, QueryEventHandler};
use crate::domain::entities::{event_date, TaskEntity};
use crate::domain::errors::QueryEventError;
use crate::ports::outbound::QueryEntityStore;
use async_trait::async_trait;
use shared_types::{EventKind, EventPayload, RuntimeEvent, Task, TaskStatus};
use std::sync::Arc;
use tracing::debug;

const KINDS: &[EventKind] = &[
    EventKind::TaskCreated,
    EventKind::TaskAssigned,
    EventKind::TaskUpdated,
    EventKind::TaskActivated,
    EventKind::TaskSuspended,
    EventKind::TaskCompleted,
    EventKind::TaskCancelled,
];

pub struct TaskHandler {
    store: Arc<dyn QueryEntityStore>,
}

impl TaskHandler {
    pub fn new(store: Arc<dyn QueryEntityStore>) -> Self {
        Self { store }
    }

    async fn existing(&self, id: &str) -> Result<TaskEntity, QueryEventError> {
        self.store
            .find_task(id)
            .await?
            .ok_or_else(|| QueryEventError::not_found("Task", id))
    }

    async fn created(&self, event: &RuntimeEvent, task: &Task) -> Result<(), QueryEventError> {
        if self.store.find_task(&task.id).await?.is_some() {
            debug!("[pq-01] Task {} already present", task.id);
            return Ok(());
        }

        if let Some(process_instance_id) = &task.process_instance_id {
            if self
                .store
                .find_process_instance(process_instance_id)
                .await?
                .is_none()
            {
                return Err(QueryEventError::not_found(
                    "ProcessInstance",
                    process_instance_id.clone(),
                ));
            }
        }

        let now = event_date(event.timestamp);
        let entity = TaskEntity {
            id: task.id.clone(),
            name: task.name.clone(),
            description: task.description.clone(),
            assignee: task.assignee.clone(),
            owner: task.owner.clone(),
            priority: task.priority,
            app_name: event.app_name.clone(),
            process_instance_id: task.process_instance_id.clone(),
            process_definition_id: task.process_definition_id.clone(),
            process_definition_version: task.process_definition_version,
            business_key: task.business_key.clone(),
            task_definition_key: task.task_definition_key.clone(),
            parent_task_id: task.parent_task_id.clone(),
            form_key: task.form_key.clone(),
            status: task.status,
            due_date: task.due_date.map(event_date),
            created_date: task.created_date.map(event_date).unwrap_or(now),
            claimed_date: task.claimed_date.map(event_date),
            completed_date: None,
            completed_by: None,
            duration: None,
            last_modified: now,
        };

        self.store.save_task(entity).await?;
        Ok(())
    }

    async fn apply(&self, event: &RuntimeEvent, task: &Task) -> Result<(), QueryEventError> {
        let mut entity = self.existing(&task.id).await?;
        let now = event_date(event.timestamp);

        match event.kind() {
            EventKind::TaskAssigned => {
                entity.assignee = task.assignee.clone();
                entity.claimed_date = Some(task.claimed_date.map(event_date).unwrap_or(now));
                entity.status = TaskStatus::Assigned;
            }
            EventKind::TaskUpdated => {
                entity.name = task.name.clone();
                entity.description = task.description.clone();
                entity.priority = task.priority;
                entity.due_date = task.due_date.map(event_date);
                entity.owner = task.owner.clone();
                entity.form_key = task.form_key.clone();
                entity.parent_task_id = task.parent_task_id.clone();
            }
            EventKind::TaskActivated => {
                entity.status = if entity.assignee.is_some() {
                    TaskStatus::Assigned
                } else {
                    TaskStatus::Created
                };
            }
            EventKind::TaskSuspended => entity.status = TaskStatus::Suspended,
            EventKind::TaskCompleted => {
                let completed = task.completed_date.map(event_date).unwrap_or(now);
                entity.status = TaskStatus::Completed;
                entity.completed_date = Some(completed);
                entity.completed_by = task.completed_by.clone().or(entity.assignee.clone());
                entity.duration = Some((completed - entity.created_date).num_milliseconds());
            }
            EventKind::TaskCancelled => {
                if entity.status.is_terminal() {
                    debug!(
                        "[pq-01] Task {} already {:?}, ignoring cancel",
                        entity.id, entity.status
                    );
                    return Ok(());
                }
                entity.status = TaskStatus::Cancelled;
            }
            _ => return Err(unexpected(self.name(), event)),
        }

        entity.last_modified = now;
        self.store.save_task(entity).await?;
        Ok(())
    }
}

#[async_trait]
impl QueryEventHandler for TaskHandler {
    fn name(&self) -> &'static str {
        "TaskHandler"
    }

    fn handled_kinds(&self) -> &'static [EventKind] {
        KINDS
    }

    async fn handle(&self, event: &RuntimeEvent) -> Result<(), QueryEventError> {
        match &event.payload {
            EventPayload::TaskCreated(t) => self.created(event, t).await,
            EventPayload::TaskAssigned(t)
            | EventPayload::TaskUpdated(t)
            | EventPayload::TaskActivated(t)
            | EventPayload::TaskSuspended(t)
            | EventPayload::TaskCompleted(t)
            | EventPayload::TaskCancelled(t) => self.apply(event, t).await,
            _ => Err(unexpected(self.name(), event)),
        }
    }
}
