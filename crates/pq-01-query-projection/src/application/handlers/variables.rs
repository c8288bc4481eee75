//! Process and task variables
//!
//! A variable carrying a task id belongs to that task; otherwise it belongs
//! to its process instance.

use super::{unexpected, QueryEventHandler};
use crate::domain::entities::{event_date, ProcessVariableEntity, TaskVariableEntity};
use crate::domain::errors::QueryEventError;
use crate::ports::outbound::QueryEntityStore;
use async_trait::async_trait;
use shared_types::{EventKind, EventPayload, RuntimeEvent, VariableInstance};
use std::sync::Arc;
use tracing::debug;

const KINDS: &[EventKind] = &[
    EventKind::VariableCreated,
    EventKind::VariableUpdated,
    EventKind::VariableDeleted,
];

/// Where a variable lives.
enum Scope<'a> {
    Process(&'a str),
    Task(&'a str),
}

fn scope(variable: &VariableInstance) -> Result<Scope<'_>, QueryEventError> {
    match (&variable.task_id, &variable.process_instance_id) {
        (Some(task_id), _) => Ok(Scope::Task(task_id)),
        (None, Some(process_instance_id)) => Ok(Scope::Process(process_instance_id)),
        (None, None) => Err(QueryEventError::IllegalState(format!(
            "variable {} has neither a task nor a process instance",
            variable.name
        ))),
    }
}

pub struct VariableHandler {
    store: Arc<dyn QueryEntityStore>,
}

impl VariableHandler {
    pub fn new(store: Arc<dyn QueryEntityStore>) -> Self {
        Self { store }
    }

    async fn created(
        &self,
        event: &RuntimeEvent,
        variable: &VariableInstance,
    ) -> Result<(), QueryEventError> {
        let now = event_date(event.timestamp);

        match scope(variable)? {
            Scope::Process(process_instance_id) => {
                if self
                    .store
                    .find_process_variable(process_instance_id, &variable.name)
                    .await?
                    .is_some()
                {
                    debug!(
                        "[pq-01] Process variable {} already exists on {}",
                        variable.name, process_instance_id
                    );
                    return Ok(());
                }
                self.store
                    .save_process_variable(ProcessVariableEntity {
                        process_instance_id: process_instance_id.to_string(),
                        name: variable.name.clone(),
                        variable_type: variable.variable_type.clone(),
                        value: variable.value.clone(),
                        app_name: event.app_name.clone(),
                        create_time: now,
                        last_updated_time: now,
                    })
                    .await?;
            }
            Scope::Task(task_id) => {
                if self
                    .store
                    .find_task_variable(task_id, &variable.name)
                    .await?
                    .is_some()
                {
                    debug!(
                        "[pq-01] Task variable {} already exists on {}",
                        variable.name, task_id
                    );
                    return Ok(());
                }
                self.store
                    .save_task_variable(TaskVariableEntity {
                        task_id: task_id.to_string(),
                        process_instance_id: variable.process_instance_id.clone(),
                        name: variable.name.clone(),
                        variable_type: variable.variable_type.clone(),
                        value: variable.value.clone(),
                        app_name: event.app_name.clone(),
                        create_time: now,
                        last_updated_time: now,
                    })
                    .await?;
            }
        }

        Ok(())
    }

    async fn updated(
        &self,
        event: &RuntimeEvent,
        variable: &VariableInstance,
    ) -> Result<(), QueryEventError> {
        let now = event_date(event.timestamp);

        match scope(variable)? {
            Scope::Process(process_instance_id) => {
                let mut entity = self
                    .store
                    .find_process_variable(process_instance_id, &variable.name)
                    .await?
                    .ok_or_else(|| {
                        QueryEventError::not_found(
                            "ProcessVariable",
                            format!("{}:{}", process_instance_id, variable.name),
                        )
                    })?;
                entity.variable_type = variable.variable_type.clone();
                entity.value = variable.value.clone();
                entity.last_updated_time = now;
                self.store.save_process_variable(entity).await?;
            }
            Scope::Task(task_id) => {
                let mut entity = self
                    .store
                    .find_task_variable(task_id, &variable.name)
                    .await?
                    .ok_or_else(|| {
                        QueryEventError::not_found(
                            "TaskVariable",
                            format!("{}:{}", task_id, variable.name),
                        )
                    })?;
                entity.variable_type = variable.variable_type.clone();
                entity.value = variable.value.clone();
                entity.last_updated_time = now;
                self.store.save_task_variable(entity).await?;
            }
        }

        Ok(())
    }

    async fn deleted(&self, variable: &VariableInstance) -> Result<(), QueryEventError> {
        let (removed, entity, owner) = match scope(variable)? {
            Scope::Process(process_instance_id) => (
                self.store
                    .delete_process_variable(process_instance_id, &variable.name)
                    .await?,
                "ProcessVariable",
                process_instance_id,
            ),
            Scope::Task(task_id) => (
                self.store
                    .delete_task_variable(task_id, &variable.name)
                    .await?,
                "TaskVariable",
                task_id,
            ),
        };

        if !removed {
            return Err(QueryEventError::not_found(
                entity,
                format!("{}:{}", owner, variable.name),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl QueryEventHandler for VariableHandler {
    fn name(&self) -> &'static str {
        "VariableHandler"
    }

    fn handled_kinds(&self) -> &'static [EventKind] {
        KINDS
    }

    async fn handle(&self, event: &RuntimeEvent) -> Result<(), QueryEventError> {
        match &event.payload {
            EventPayload::VariableCreated(v) => self.created(event, v).await,
            EventPayload::VariableUpdated(v) => self.updated(event, v).await,
            EventPayload::VariableDeleted(v) => self.deleted(v).await,
            _ => Err(unexpected(self.name(), event)),
        }
    }
}
