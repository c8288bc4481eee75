//! Process instance lifecycle

use super::{unexpected, QueryEventHandler};
use crate::domain::entities::{event_date, ProcessInstanceEntity};
use crate::domain::errors::QueryEventError;
use crate::ports::outbound::QueryEntityStore;
use async_trait::async_trait;
use shared_types::{
    EventKind, EventPayload, ProcessInstance, ProcessInstanceStatus, RuntimeEvent, TaskStatus,
};
use std::sync::Arc;
use tracing::{debug, info};

const KINDS: &[EventKind] = &[
    EventKind::ProcessCreated,
    EventKind::ProcessStarted,
    EventKind::ProcessUpdated,
    EventKind::ProcessSuspended,
    EventKind::ProcessResumed,
    EventKind::ProcessCompleted,
    EventKind::ProcessCancelled,
    EventKind::ProcessDeleted,
];

pub struct ProcessInstanceHandler {
    store: Arc<dyn QueryEntityStore>,
}

impl ProcessInstanceHandler {
    pub fn new(store: Arc<dyn QueryEntityStore>) -> Self {
        Self { store }
    }

    async fn existing(&self, id: &str) -> Result<ProcessInstanceEntity, QueryEventError> {
        self.store
            .find_process_instance(id)
            .await?
            .ok_or_else(|| QueryEventError::not_found("ProcessInstance", id))
    }

    async fn created(
        &self,
        event: &RuntimeEvent,
        process: &ProcessInstance,
    ) -> Result<(), QueryEventError> {
        if self.store.find_process_instance(&process.id).await?.is_some() {
            debug!("[pq-01] Process instance {} already present", process.id);
            return Ok(());
        }

        let entity = ProcessInstanceEntity {
            id: process.id.clone(),
            name: process.name.clone(),
            app_name: event.app_name.clone(),
            app_version: event.app_version.clone(),
            service_name: event.service_name.clone(),
            process_definition_id: process.process_definition_id.clone(),
            process_definition_key: process.process_definition_key.clone(),
            process_definition_name: process.process_definition_name.clone(),
            process_definition_version: process.process_definition_version,
            initiator: process.initiator.clone(),
            business_key: process.business_key.clone(),
            parent_id: process.parent_id.clone(),
            status: ProcessInstanceStatus::Created,
            start_date: process.start_date.map(event_date),
            completed_date: None,
            suspended_date: None,
            last_modified: event_date(event.timestamp),
        };

        self.store.save_process_instance(entity).await?;
        Ok(())
    }

    async fn started(
        &self,
        event: &RuntimeEvent,
        process: &ProcessInstance,
    ) -> Result<(), QueryEventError> {
        let mut entity = self.existing(&process.id).await?;

        if entity.status != ProcessInstanceStatus::Created {
            debug!(
                "[pq-01] Process instance {} already {:?}, ignoring start",
                entity.id, entity.status
            );
            return Ok(());
        }

        entity.status = ProcessInstanceStatus::Running;
        entity.start_date = Some(
            process
                .start_date
                .map(event_date)
                .unwrap_or_else(|| event_date(event.timestamp)),
        );
        entity.last_modified = event_date(event.timestamp);

        self.store.save_process_instance(entity).await?;
        Ok(())
    }

    async fn updated(
        &self,
        event: &RuntimeEvent,
        process: &ProcessInstance,
    ) -> Result<(), QueryEventError> {
        let mut entity = self.existing(&process.id).await?;

        entity.name = process.name.clone();
        entity.business_key = process.business_key.clone();
        if process.process_definition_id.is_some() {
            entity.process_definition_id = process.process_definition_id.clone();
        }
        if process.process_definition_key.is_some() {
            entity.process_definition_key = process.process_definition_key.clone();
        }
        if process.process_definition_name.is_some() {
            entity.process_definition_name = process.process_definition_name.clone();
        }
        if process.process_definition_version.is_some() {
            entity.process_definition_version = process.process_definition_version;
        }
        entity.last_modified = event_date(event.timestamp);

        self.store.save_process_instance(entity).await?;
        Ok(())
    }

    async fn transition(
        &self,
        event: &RuntimeEvent,
        process: &ProcessInstance,
        status: ProcessInstanceStatus,
    ) -> Result<(), QueryEventError> {
        let mut entity = self.existing(&process.id).await?;

        if entity.status.is_terminal() {
            return Err(QueryEventError::IllegalState(format!(
                "process instance {} is {:?} and cannot become {:?}",
                entity.id, entity.status, status
            )));
        }

        let now = event_date(event.timestamp);
        entity.status = status;
        entity.last_modified = now;
        match status {
            ProcessInstanceStatus::Suspended => entity.suspended_date = Some(now),
            ProcessInstanceStatus::Completed | ProcessInstanceStatus::Cancelled => {
                entity.completed_date = Some(now)
            }
            _ => {}
        }

        self.store.save_process_instance(entity).await?;

        if status.is_terminal() {
            self.cancel_open_tasks(&process.id, event).await?;
        }
        Ok(())
    }

    /// Tasks cannot outlive their process instance.
    async fn cancel_open_tasks(
        &self,
        process_instance_id: &str,
        event: &RuntimeEvent,
    ) -> Result<(), QueryEventError> {
        let open: Vec<_> = self
            .store
            .tasks_for_process_instance(process_instance_id)
            .await?
            .into_iter()
            .filter(|task| !task.status.is_terminal())
            .collect();

        if !open.is_empty() {
            info!(
                "[pq-01] Cancelling {} open task(s) of process instance {}",
                open.len(),
                process_instance_id
            );
        }

        for mut task in open {
            task.status = TaskStatus::Cancelled;
            task.last_modified = event_date(event.timestamp);
            self.store.save_task(task).await?;
        }
        Ok(())
    }

    async fn deleted(&self, process: &ProcessInstance) -> Result<(), QueryEventError> {
        let entity = self.existing(&process.id).await?;

        if !entity.status.is_terminal() {
            return Err(QueryEventError::IllegalState(format!(
                "process instance {} must be completed or cancelled before deletion, was {:?}",
                entity.id, entity.status
            )));
        }

        self.store.delete_process_instance(&entity.id).await?;
        Ok(())
    }
}

#[async_trait]
impl QueryEventHandler for ProcessInstanceHandler {
    fn name(&self) -> &'static str {
        "ProcessInstanceHandler"
    }

    fn handled_kinds(&self) -> &'static [EventKind] {
        KINDS
    }

    async fn handle(&self, event: &RuntimeEvent) -> Result<(), QueryEventError> {
        match &event.payload {
            EventPayload::ProcessCreated(p) => self.created(event, p).await,
            EventPayload::ProcessStarted(p) => self.started(event, p).await,
            EventPayload::ProcessUpdated(p) => self.updated(event, p).await,
            EventPayload::ProcessSuspended(p) => {
                self.transition(event, p, ProcessInstanceStatus::Suspended)
                    .await
            }
            EventPayload::ProcessResumed(p) => {
                self.transition(event, p, ProcessInstanceStatus::Running)
                    .await
            }
            EventPayload::ProcessCompleted(p) => {
                self.transition(event, p, ProcessInstanceStatus::Completed)
                    .await
            }
            EventPayload::ProcessCancelled(p) => {
                self.transition(event, p, ProcessInstanceStatus::Cancelled)
                    .await
            }
            EventPayload::ProcessDeleted(p) => self.deleted(p).await,
            _ => Err(unexpected(self.name(), event)),
        }
    }
}
