//! Query Projection Service
//!
//! Main service implementing QueryEventApi.

use crate::algorithms::{build_fetch_plan, EventBatchOptimizer};
use crate::application::context::QueryEventHandlerContext;
use crate::config::ProjectionConfig;
use crate::domain::errors::{QueryEventError, RegistryError};
use crate::domain::value_objects::{BatchOutcome, FetchPlan};
use crate::ports::inbound::QueryEventApi;
use crate::ports::outbound::QueryEntityStore;
use async_trait::async_trait;
use shared_types::RuntimeEvent;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Query Projection Service
///
/// Orchestrates the batch pipeline:
/// 1. Validate input
/// 2. Prefetch the entities the batch touches
/// 3. Reorder into precedence order
/// 4. Dispatch every event inside one store batch
/// 5. Commit, or roll back on the first failure
pub struct QueryProjectionService {
    config: ProjectionConfig,
    store: Arc<dyn QueryEntityStore>,
    context: QueryEventHandlerContext,
    optimizer: EventBatchOptimizer,
}

impl QueryProjectionService {
    /// Create a service with an explicit handler context
    pub fn new(
        config: ProjectionConfig,
        store: Arc<dyn QueryEntityStore>,
        context: QueryEventHandlerContext,
    ) -> Self {
        let optimizer = EventBatchOptimizer::new(config.tie_break);
        Self {
            config,
            store,
            context,
            optimizer,
        }
    }

    /// Create a service with the full handler set over `store`
    pub fn with_store(
        config: ProjectionConfig,
        store: Arc<dyn QueryEntityStore>,
    ) -> Result<Self, RegistryError> {
        let context = QueryEventHandlerContext::with_default_handlers(store.clone())?;
        Ok(Self::new(config, store, context))
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn context(&self) -> &QueryEventHandlerContext {
        &self.context
    }

    /// Validate batch size
    fn validate_batch(&self, events: &[RuntimeEvent]) -> Result<(), QueryEventError> {
        if events.is_empty() {
            return Err(QueryEventError::EmptyBatch);
        }

        if events.len() > self.config.max_batch_size {
            return Err(QueryEventError::BatchTooLarge {
                size: events.len(),
                max: self.config.max_batch_size,
            });
        }

        Ok(())
    }

    /// Preload the batch's root entities. Failure only costs performance.
    async fn prefetch(&self, events: &[RuntimeEvent]) {
        let Some(plan) = build_fetch_plan(events) else {
            debug!("[pq-01] Batch has no process instance, nothing to prefetch");
            return;
        };

        if let Err(e) = self.store.prefetch(&plan).await {
            warn!(
                process_instance_id = %plan.process_instance_id,
                "[pq-01] Prefetch failed, continuing without it: {}",
                e
            );
        }
    }

    /// Apply `events` in order inside the open store batch.
    async fn dispatch_all(&self, events: &[RuntimeEvent]) -> Result<BatchOutcome, QueryEventError> {
        let mut outcome = BatchOutcome::default();
        for event in events {
            let dispatch =
                self.context
                    .handle(event)
                    .await
                    .map_err(|e| QueryEventError::HandlerFailed {
                        event_id: event.id.clone(),
                        kind: event.kind(),
                        source: Box::new(e),
                    })?;
            outcome.record(dispatch);
        }
        Ok(outcome)
    }
}

#[async_trait]
impl QueryEventApi for QueryProjectionService {
    async fn handle_batch(
        &self,
        events: Vec<RuntimeEvent>,
    ) -> Result<BatchOutcome, QueryEventError> {
        // 1. Validate input
        self.validate_batch(&events)?;

        // 2. Prefetch
        self.prefetch(&events).await;

        // 3. Reorder
        let events = self.optimize(events);

        // 4. Dispatch
        self.store.begin_batch().await?;
        match self.dispatch_all(&events).await {
            Ok(outcome) => {
                self.store.commit_batch().await?;
                info!(
                    handled = outcome.handled,
                    unhandled = outcome.unhandled,
                    "[pq-01] Batch of {} events applied",
                    events.len()
                );
                Ok(outcome)
            }
            Err(e) => {
                // 5. Undo everything the batch wrote
                if let Err(rollback) = self.store.rollback_batch().await {
                    error!("[pq-01] Rollback failed: {}", rollback);
                }
                error!("[pq-01] Batch rejected: {}", e);
                Err(e)
            }
        }
    }

    fn optimize(&self, events: Vec<RuntimeEvent>) -> Vec<RuntimeEvent> {
        self.optimizer.optimize(events)
    }

    fn fetch_plan(&self, events: &[RuntimeEvent]) -> Option<FetchPlan> {
        build_fetch_plan(events)
    }
}
