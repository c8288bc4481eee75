//! Task candidate users and groups

use super::{unexpected, QueryEventHandler};
use crate::domain::entities::{TaskCandidateGroupEntity, TaskCandidateUserEntity};
use crate::domain::errors::QueryEventError;
use crate::ports::outbound::QueryEntityStore;
use async_trait::async_trait;
use shared_types::{EventKind, EventPayload, RuntimeEvent};
use std::sync::Arc;
use tracing::debug;

const KINDS: &[EventKind] = &[
    EventKind::TaskCandidateUserAdded,
    EventKind::TaskCandidateUserRemoved,
    EventKind::TaskCandidateGroupAdded,
    EventKind::TaskCandidateGroupRemoved,
];

pub struct TaskCandidateHandler {
    store: Arc<dyn QueryEntityStore>,
}

impl TaskCandidateHandler {
    pub fn new(store: Arc<dyn QueryEntityStore>) -> Self {
        Self { store }
    }

    async fn require_task(&self, task_id: &str) -> Result<(), QueryEventError> {
        match self.store.find_task(task_id).await? {
            Some(_) => Ok(()),
            None => Err(QueryEventError::not_found("Task", task_id)),
        }
    }
}

#[async_trait]
impl QueryEventHandler for TaskCandidateHandler {
    fn name(&self) -> &'static str {
        "TaskCandidateHandler"
    }

    fn handled_kinds(&self) -> &'static [EventKind] {
        KINDS
    }

    async fn handle(&self, event: &RuntimeEvent) -> Result<(), QueryEventError> {
        match &event.payload {
            EventPayload::TaskCandidateUserAdded(candidate) => {
                self.require_task(&candidate.task_id).await?;
                let entity = TaskCandidateUserEntity {
                    task_id: candidate.task_id.clone(),
                    user_id: candidate.user_id.clone(),
                };
                if !self.store.add_task_candidate_user(entity).await? {
                    debug!(
                        "[pq-01] Candidate user {} already on task {}",
                        candidate.user_id, candidate.task_id
                    );
                }
                Ok(())
            }
            EventPayload::TaskCandidateUserRemoved(candidate) => {
                let entity = TaskCandidateUserEntity {
                    task_id: candidate.task_id.clone(),
                    user_id: candidate.user_id.clone(),
                };
                if !self.store.remove_task_candidate_user(&entity).await? {
                    return Err(QueryEventError::not_found(
                        "TaskCandidateUser",
                        event.payload.entity_id(),
                    ));
                }
                Ok(())
            }
            EventPayload::TaskCandidateGroupAdded(candidate) => {
                self.require_task(&candidate.task_id).await?;
                let entity = TaskCandidateGroupEntity {
                    task_id: candidate.task_id.clone(),
                    group_id: candidate.group_id.clone(),
                };
                if !self.store.add_task_candidate_group(entity).await? {
                    debug!(
                        "[pq-01] Candidate group {} already on task {}",
                        candidate.group_id, candidate.task_id
                    );
                }
                Ok(())
            }
            EventPayload::TaskCandidateGroupRemoved(candidate) => {
                let entity = TaskCandidateGroupEntity {
                    task_id: candidate.task_id.clone(),
                    group_id: candidate.group_id.clone(),
                };
                if !self.store.remove_task_candidate_group(&entity).await? {
                    return Err(QueryEventError::not_found(
                        "TaskCandidateGroup",
                        event.payload.entity_id(),
                    ));
                }
                Ok(())
            }
            _ => Err(unexpected(self.name(), event)),
        }
    }
}
