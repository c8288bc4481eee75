//! BPMN activities and sequence flows

use super::{unexpected, QueryEventHandler};
use crate::domain::entities::{
    event_date, BpmnActivityEntity, BpmnActivityStatus, BpmnSequenceFlowEntity,
};
use crate::domain::errors::QueryEventError;
use crate::ports::outbound::QueryEntityStore;
use async_trait::async_trait;
use shared_types::{BpmnActivity, EventKind, EventPayload, RuntimeEvent, SequenceFlow};
use std::sync::Arc;

const KINDS: &[EventKind] = &[
    EventKind::ActivityStarted,
    EventKind::ActivityCompleted,
    EventKind::ActivityCancelled,
    EventKind::SequenceFlowTaken,
];

pub struct BpmnActivityHandler {
    store: Arc<dyn QueryEntityStore>,
}

impl BpmnActivityHandler {
    pub fn new(store: Arc<dyn QueryEntityStore>) -> Self {
        Self { store }
    }

    async fn started(
        &self,
        event: &RuntimeEvent,
        activity: &BpmnActivity,
    ) -> Result<(), QueryEventError> {
        let id = activity.activity_id();
        let now = event_date(event.timestamp);

        let entity = match self.store.find_activity(&id).await? {
            Some(mut existing) => {
                existing.status = BpmnActivityStatus::Started;
                existing.started_date = Some(now);
                existing
            }
            None => BpmnActivityEntity {
                id,
                element_id: activity.element_id.clone(),
                activity_name: activity.activity_name.clone(),
                activity_type: activity.activity_type.clone(),
                process_instance_id: activity.process_instance_id.clone(),
                process_definition_id: activity.process_definition_id.clone(),
                execution_id: activity.execution_id.clone(),
                status: BpmnActivityStatus::Started,
                started_date: Some(now),
                completed_date: None,
                cancelled_date: None,
            },
        };

        self.store.save_activity(entity).await?;
        Ok(())
    }

    async fn finished(
        &self,
        event: &RuntimeEvent,
        activity: &BpmnActivity,
        status: BpmnActivityStatus,
    ) -> Result<(), QueryEventError> {
        let id = activity.activity_id();
        let mut entity = self
            .store
            .find_activity(&id)
            .await?
            .ok_or_else(|| QueryEventError::not_found("BpmnActivity", id))?;

        let now = event_date(event.timestamp);
        entity.status = status;
        match status {
            BpmnActivityStatus::Completed => entity.completed_date = Some(now),
            BpmnActivityStatus::Cancelled => entity.cancelled_date = Some(now),
            BpmnActivityStatus::Started => {}
        }

        self.store.save_activity(entity).await?;
        Ok(())
    }

    async fn flow_taken(
        &self,
        event: &RuntimeEvent,
        flow: &SequenceFlow,
    ) -> Result<(), QueryEventError> {
        self.store
            .save_sequence_flow(BpmnSequenceFlowEntity {
                id: event.id.clone(),
                element_id: flow.element_id.clone(),
                source_activity_element_id: flow.source_activity_element_id.clone(),
                source_activity_name: flow.source_activity_name.clone(),
                source_activity_type: flow.source_activity_type.clone(),
                target_activity_element_id: flow.target_activity_element_id.clone(),
                target_activity_name: flow.target_activity_name.clone(),
                target_activity_type: flow.target_activity_type.clone(),
                process_instance_id: flow.process_instance_id.clone(),
                process_definition_id: flow.process_definition_id.clone(),
                date: event_date(event.timestamp),
            })
            .await?;
        Ok(())
    }
}

#[async_trait]
impl QueryEventHandler for BpmnActivityHandler {
    fn name(&self) -> &'static str {
        "BpmnActivityHandler"
    }

    fn handled_kinds(&self) -> &'static [EventKind] {
        KINDS
    }

    async fn handle(&self, event: &RuntimeEvent) -> Result<(), QueryEventError> {
        match &event.payload {
            EventPayload::ActivityStarted(a) => self.started(event, a).await,
            EventPayload::ActivityCompleted(a) => {
                self.finished(event, a, BpmnActivityStatus::Completed).await
            }
            EventPayload::ActivityCancelled(a) => {
                self.finished(event, a, BpmnActivityStatus::Cancelled).await
            }
            EventPayload::SequenceFlowTaken(flow) => self.flow_taken(event, flow).await,
            _ => Err(unexpected(self.name(), event)),
        }
    }
}
