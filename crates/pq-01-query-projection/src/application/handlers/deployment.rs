//! Process definitions and application deployments

use super::{unexpected, QueryEventHandler};
use crate::domain::entities::{ApplicationEntity, ProcessDefinitionEntity};
use crate::domain::errors::QueryEventError;
use crate::ports::outbound::QueryEntityStore;
use async_trait::async_trait;
use shared_types::{EventKind, EventPayload, RuntimeEvent};
use std::sync::Arc;
use tracing::info;

const KINDS: &[EventKind] = &[EventKind::ProcessDeployed, EventKind::ApplicationDeployed];

pub struct DeploymentHandler {
    store: Arc<dyn QueryEntityStore>,
}

impl DeploymentHandler {
    pub fn new(store: Arc<dyn QueryEntityStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl QueryEventHandler for DeploymentHandler {
    fn name(&self) -> &'static str {
        "DeploymentHandler"
    }

    fn handled_kinds(&self) -> &'static [EventKind] {
        KINDS
    }

    async fn handle(&self, event: &RuntimeEvent) -> Result<(), QueryEventError> {
        match &event.payload {
            EventPayload::ProcessDeployed(definition) => {
                info!(
                    "[pq-01] Process definition {} v{} deployed",
                    definition.key, definition.version
                );
                self.store
                    .save_process_definition(ProcessDefinitionEntity {
                        id: definition.id.clone(),
                        key: definition.key.clone(),
                        name: definition.name.clone(),
                        description: definition.description.clone(),
                        version: definition.version,
                        form_key: definition.form_key.clone(),
                        category: definition.category.clone(),
                        app_name: event.app_name.clone(),
                        app_version: event.app_version.clone(),
                    })
                    .await?;
                Ok(())
            }
            EventPayload::ApplicationDeployed(deployment) => {
                info!(
                    "[pq-01] Application {} v{} deployed",
                    deployment.name, deployment.version
                );
                self.store
                    .save_application(ApplicationEntity {
                        id: deployment.id.clone(),
                        name: deployment.name.clone(),
                        version: deployment.version,
                    })
                    .await?;
                Ok(())
            }
            _ => Err(unexpected(self.name(), event)),
        }
    }
}
