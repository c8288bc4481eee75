//! Process candidate starters

use super::{unexpected, QueryEventHandler};
use crate::domain::entities::{
    ProcessCandidateStarterGroupEntity, ProcessCandidateStarterUserEntity,
};
use crate::domain::errors::QueryEventError;
use crate::ports::outbound::QueryEntityStore;
use async_trait::async_trait;
use shared_types::{EventKind, EventPayload, RuntimeEvent};
use std::sync::Arc;
use tracing::debug;

const KINDS: &[EventKind] = &[
    EventKind::ProcessCandidateStarterUserAdded,
    EventKind::ProcessCandidateStarterUserRemoved,
    EventKind::ProcessCandidateStarterGroupAdded,
    EventKind::ProcessCandidateStarterGroupRemoved,
];

pub struct ProcessCandidateStarterHandler {
    store: Arc<dyn QueryEntityStore>,
}

impl ProcessCandidateStarterHandler {
    pub fn new(store: Arc<dyn QueryEntityStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl QueryEventHandler for ProcessCandidateStarterHandler {
    fn name(&self) -> &'static str {
        "ProcessCandidateStarterHandler"
    }

    fn handled_kinds(&self) -> &'static [EventKind] {
        KINDS
    }

    async fn handle(&self, event: &RuntimeEvent) -> Result<(), QueryEventError> {
        match &event.payload {
            EventPayload::ProcessCandidateStarterUserAdded(starter) => {
                let entity = ProcessCandidateStarterUserEntity {
                    process_definition_id: starter.process_definition_id.clone(),
                    user_id: starter.user_id.clone(),
                };
                if !self.store.add_candidate_starter_user(entity).await? {
                    debug!(
                        "[pq-01] Candidate starter user {} already on {}",
                        starter.user_id, starter.process_definition_id
                    );
                }
                Ok(())
            }
            EventPayload::ProcessCandidateStarterUserRemoved(starter) => {
                let entity = ProcessCandidateStarterUserEntity {
                    process_definition_id: starter.process_definition_id.clone(),
                    user_id: starter.user_id.clone(),
                };
                if !self.store.remove_candidate_starter_user(&entity).await? {
                    return Err(QueryEventError::not_found(
                        "ProcessCandidateStarterUser",
                        event.payload.entity_id(),
                    ));
                }
                Ok(())
            }
            EventPayload::ProcessCandidateStarterGroupAdded(starter) => {
                let entity = ProcessCandidateStarterGroupEntity {
                    process_definition_id: starter.process_definition_id.clone(),
                    group_id: starter.group_id.clone(),
                };
                if !self.store.add_candidate_starter_group(entity).await? {
                    debug!(
                        "[pq-01] Candidate starter group {} already on {}",
                        starter.group_id, starter.process_definition_id
                    );
                }
                Ok(())
            }
            EventPayload::ProcessCandidateStarterGroupRemoved(starter) => {
                let entity = ProcessCandidateStarterGroupEntity {
                    process_definition_id: starter.process_definition_id.clone(),
                    group_id: starter.group_id.clone(),
                };
                if !self.store.remove_candidate_starter_group(&entity).await? {
                    return Err(QueryEventError::not_found(
                        "ProcessCandidateStarterGroup",
                        event.payload.entity_id(),
                    ));
                }
                Ok(())
            }
            _ => Err(unexpected(self.name(), event)),
        }
    }
}
