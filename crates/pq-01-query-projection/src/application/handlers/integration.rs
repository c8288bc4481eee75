//! Connector integrations issued by service tasks

use super::{unexpected, QueryEventHandler};
use crate::domain::entities::{event_date, IntegrationContextEntity, IntegrationContextStatus};
use crate::domain::errors::QueryEventError;
use crate::ports::outbound::QueryEntityStore;
use async_trait::async_trait;
use shared_types::{EventKind, EventPayload, IntegrationContext, RuntimeEvent};
use std::sync::Arc;
use tracing::warn;

const KINDS: &[EventKind] = &[
    EventKind::IntegrationRequested,
    EventKind::IntegrationResultReceived,
    EventKind::IntegrationErrorReceived,
];

pub struct IntegrationContextHandler {
    store: Arc<dyn QueryEntityStore>,
}

impl IntegrationContextHandler {
    pub fn new(store: Arc<dyn QueryEntityStore>) -> Self {
        Self { store }
    }

    async fn requested(
        &self,
        event: &RuntimeEvent,
        context: &IntegrationContext,
    ) -> Result<(), QueryEventError> {
        let now = event_date(event.timestamp);

        let entity = match self.store.find_integration_context(&context.id).await? {
            Some(mut existing) => {
                existing.status = IntegrationContextStatus::IntegrationRequested;
                existing.request_date = Some(now);
                existing.in_bound_variables = context.in_bound_variables.clone();
                existing
            }
            None => IntegrationContextEntity {
                id: context.id.clone(),
                process_instance_id: context.process_instance_id.clone(),
                process_definition_id: context.process_definition_id.clone(),
                execution_id: context.execution_id.clone(),
                business_key: context.business_key.clone(),
                client_id: context.client_id.clone(),
                client_name: context.client_name.clone(),
                client_type: context.client_type.clone(),
                connector_type: context.connector_type.clone(),
                status: IntegrationContextStatus::IntegrationRequested,
                in_bound_variables: context.in_bound_variables.clone(),
                out_bound_variables: Default::default(),
                request_date: Some(now),
                result_date: None,
                error_date: None,
                error_message: None,
                error_class_name: None,
            },
        };

        self.store.save_integration_context(entity).await?;
        Ok(())
    }

    async fn answered(
        &self,
        event: &RuntimeEvent,
        context: &IntegrationContext,
    ) -> Result<(), QueryEventError> {
        let mut entity = self
            .store
            .find_integration_context(&context.id)
            .await?
            .ok_or_else(|| QueryEventError::not_found("IntegrationContext", context.id.clone()))?;

        let now = event_date(event.timestamp);
        if event.kind() == EventKind::IntegrationErrorReceived {
            warn!(
                "[pq-01] Integration {} for client {} failed: {}",
                context.id,
                context.client_id,
                context.error_message.as_deref().unwrap_or("unknown error")
            );
            entity.status = IntegrationContextStatus::IntegrationErrorReceived;
            entity.error_date = Some(now);
            entity.error_message = context.error_message.clone();
            entity.error_class_name = context.error_class_name.clone();
        } else {
            entity.status = IntegrationContextStatus::IntegrationResultReceived;
            entity.result_date = Some(now);
            entity.out_bound_variables = context.out_bound_variables.clone();
        }

        self.store.save_integration_context(entity).await?;
        Ok(())
    }
}

#[async_trait]
impl QueryEventHandler for IntegrationContextHandler {
    fn name(&self) -> &'static str {
        "IntegrationContextHandler"
    }

    fn handled_kinds(&self) -> &'static [EventKind] {
        KINDS
    }

    async fn handle(&self, event: &RuntimeEvent) -> Result<(), QueryEventError> {
        match &event.payload {
            EventPayload::IntegrationRequested(c) => self.requested(event, c).await,
            EventPayload::IntegrationResultReceived(c)
            | EventPayload::IntegrationErrorReceived(c) => self.answered(event, c).await,
            _ => Err(unexpected(self.name(), event)),
        }
    }
}
