//! IPC Handler for the query projection
//!
//! ## Boundaries
//!
//! - MUST decode the message before touching the store
//! - MUST enforce batch size limits
//! - MUST report every outcome as a `BatchResponse`, never panic

use crate::application::service::QueryProjectionService;
use crate::domain::errors::QueryEventError;
use crate::ipc::payloads::BatchResponse;
use crate::ports::inbound::QueryEventApi;
use shared_types::EventBatch;
use std::time::Instant;
use tracing::{error, info, warn};

/// Broker consumer for engine event batches.
///
/// Validates the message and delegates to the projection service.
pub struct QueryConsumerHandler {
    service: QueryProjectionService,
    max_batch_size: usize,
}

impl QueryConsumerHandler {
    pub fn new(service: QueryProjectionService) -> Self {
        let max_batch_size = service.config().max_batch_size;
        Self {
            service,
            max_batch_size,
        }
    }

    pub fn service(&self) -> &QueryProjectionService {
        &self.service
    }

    /// Handle a raw broker message (a JSON `EventBatch`).
    pub async fn handle_message(&self, bytes: &[u8]) -> BatchResponse {
        match EventBatch::from_json(bytes) {
            Ok(batch) => self.handle_batch(batch).await,
            Err(e) => {
                let e = QueryEventError::Decode(e.to_string());
                warn!("[pq-01] Dropping message of {} bytes: {}", bytes.len(), e);
                BatchResponse::rejected(String::new(), e)
            }
        }
    }

    /// Handle an already decoded batch.
    pub async fn handle_batch(&self, batch: EventBatch) -> BatchResponse {
        let start_time = Instant::now();

        if batch.len() > self.max_batch_size {
            let e = QueryEventError::BatchTooLarge {
                size: batch.len(),
                max: self.max_batch_size,
            };
            warn!("[pq-01] Batch from {} rejected: {}", batch.app_name, e);
            return BatchResponse::rejected(batch.app_name, e);
        }

        info!(
            "[pq-01] Processing batch of {} events from {}",
            batch.len(),
            batch.app_name
        );

        let EventBatch { app_name, events } = batch;
        match self.service.handle_batch(events).await {
            Ok(outcome) => {
                info!(
                    "[pq-01] ✓ Applied {} events ({} skipped) in {}ms",
                    outcome.handled,
                    outcome.unhandled,
                    start_time.elapsed().as_millis()
                );
                BatchResponse::applied(app_name, outcome)
            }
            Err(e) => {
                error!("[pq-01] ❌ Batch from {} failed: {}", app_name, e);
                BatchResponse::rejected(app_name, e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryQueryStore;
    use crate::config::ProjectionConfig;
    use shared_types::{EventPayload, ProcessInstance, RuntimeEvent, Task};
    use std::sync::Arc;

    fn handler(config: ProjectionConfig) -> (QueryConsumerHandler, Arc<InMemoryQueryStore>) {
        let store = Arc::new(InMemoryQueryStore::new());
        let service = QueryProjectionService::with_store(config, store.clone()).unwrap();
        (QueryConsumerHandler::new(service), store)
    }

    fn batch(count: usize) -> EventBatch {
        EventBatch::new(
            "rb-app",
            (0..count)
                .map(|i| {
                    RuntimeEvent::new(EventPayload::ProcessCreated(ProcessInstance::new(
                        format!("p{i}"),
                    )))
                })
                .collect(),
        )
    }

    #[tokio::test]
    async fn test_handle_message_applies_batch() {
        let (handler, store) = handler(ProjectionConfig::default());
        let bytes = batch(2).to_json().unwrap();

        let response = handler.handle_message(&bytes).await;

        assert!(response.success);
        assert_eq!(response.app_name, "rb-app");
        assert_eq!(response.handled, 2);
        assert_eq!(store.process_instance_count(), 2);
    }

    #[tokio::test]
    async fn test_reject_undecodable_message() {
        let (handler, _store) = handler(ProjectionConfig::default());

        let response = handler.handle_message(b"{not json").await;

        assert!(!response.success);
        assert!(response.app_name.is_empty());
        assert!(response.error.unwrap().contains("decode"));
    }

    #[tokio::test]
    async fn test_reject_oversized_batch() {
        let config = ProjectionConfig {
            max_batch_size: 2,
            ..Default::default()
        };
        let (handler, store) = handler(config);

        let response = handler.handle_batch(batch(5)).await;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("Batch size"));
        assert_eq!(store.process_instance_count(), 0);
    }

    #[tokio::test]
    async fn test_handler_failure_reported() {
        let (handler, _store) = handler(ProjectionConfig::default());
        let batch = EventBatch::new(
            "rb-app",
            vec![RuntimeEvent::new(EventPayload::TaskAssigned(Task::new("t1")))],
        );

        let response = handler.handle_batch(batch).await;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("Task not found: t1"));
    }
}
