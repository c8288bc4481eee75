//! Audit Service
//!
//! Main service implementing AuditApi.

use crate::config::AuditConfig;
use crate::domain::converter::EventToEntityConverter;
use crate::domain::entities::AuditOutcome;
use crate::domain::errors::AuditError;
use crate::ports::inbound::AuditApi;
use crate::ports::outbound::AuditEventStore;
use async_trait::async_trait;
use shared_types::RuntimeEvent;
use std::sync::Arc;
use tracing::{info, warn};

/// Audit Service
///
/// Converts every event of a batch before storing any of them, so a batch
/// with an unconvertible event leaves the log untouched.
pub struct AuditService {
    config: AuditConfig,
    store: Arc<dyn AuditEventStore>,
    converter: EventToEntityConverter,
}

impl AuditService {
    pub fn new(config: AuditConfig, store: Arc<dyn AuditEventStore>) -> Self {
        Self {
            config,
            store,
            converter: EventToEntityConverter::new(),
        }
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    fn validate_batch(&self, events: &[RuntimeEvent]) -> Result<(), AuditError> {
        if events.is_empty() {
            return Err(AuditError::EmptyBatch);
        }

        if events.len() > self.config.max_batch_size {
            return Err(AuditError::BatchTooLarge {
                size: events.len(),
                max: self.config.max_batch_size,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl AuditApi for AuditService {
    async fn record_batch(&self, events: Vec<RuntimeEvent>) -> Result<AuditOutcome, AuditError> {
        self.validate_batch(&events)?;

        let entities = events
            .iter()
            .map(|event| self.converter.to_entity(event))
            .collect::<Result<Vec<_>, _>>()?;

        let mut outcome = AuditOutcome::default();
        for entity in entities {
            let event_id = entity.event_id.clone();
            if self.store.insert(entity).await? {
                outcome.recorded += 1;
            } else {
                warn!(event_id = %event_id, "[pq-02] Event already audited, skipping");
                outcome.duplicates += 1;
            }
        }

        info!(
            recorded = outcome.recorded,
            duplicates = outcome.duplicates,
            "[pq-02] Audited batch of {} events",
            events.len()
        );
        Ok(outcome)
    }

    async fn find_event(&self, event_id: &str) -> Result<Option<RuntimeEvent>, AuditError> {
        match self.store.find(event_id).await? {
            Some(entity) => Ok(Some(self.converter.from_entity(&entity)?)),
            None => Ok(None),
        }
    }

    async fn events_for_process_instance(
        &self,
        process_instance_id: &str,
    ) -> Result<Vec<RuntimeEvent>, AuditError> {
        let entities = self
            .store
            .find_by_process_instance(process_instance_id)
            .await?;

        entities
            .iter()
            .map(|entity| self.converter.from_entity(entity).map_err(AuditError::from))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryAuditEventStore;
    use shared_types::{EventPayload, ProcessInstance, Task};

    fn service(config: AuditConfig) -> (AuditService, Arc<InMemoryAuditEventStore>) {
        let store = Arc::new(InMemoryAuditEventStore::new());
        (AuditService::new(config, store.clone()), store)
    }

    fn event(id: &str, payload: EventPayload, timestamp: i64) -> RuntimeEvent {
        RuntimeEvent::new(payload)
            .with_id(id)
            .with_timestamp(timestamp)
    }

    #[tokio::test]
    async fn test_record_and_read_back() {
        let (service, _store) = service(AuditConfig::default());
        let created = event(
            "e1",
            EventPayload::ProcessCreated(ProcessInstance::new("p1")),
            1,
        );

        let outcome = service.record_batch(vec![created.clone()]).await.unwrap();

        assert_eq!(outcome.recorded, 1);
        assert_eq!(service.find_event("e1").await.unwrap(), Some(created));
        assert_eq!(service.find_event("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_event_skipped() {
        let (service, store) = service(AuditConfig::default());
        let created = event(
            "e1",
            EventPayload::ProcessCreated(ProcessInstance::new("p1")),
            1,
        );

        service.record_batch(vec![created.clone()]).await.unwrap();
        let outcome = service.record_batch(vec![created]).await.unwrap();

        assert_eq!(outcome.recorded, 0);
        assert_eq!(outcome.duplicates, 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_process_history_in_time_order() {
        let (service, _store) = service(AuditConfig::default());
        let batch = vec![
            event(
                "task",
                EventPayload::TaskCreated(Task::new("t1").in_process("p1")),
                20,
            ),
            event(
                "created",
                EventPayload::ProcessCreated(ProcessInstance::new("p1")),
                10,
            ),
            event(
                "other",
                EventPayload::ProcessCreated(ProcessInstance::new("p2")),
                5,
            ),
        ];
        service.record_batch(batch).await.unwrap();

        let ids: Vec<_> = service
            .events_for_process_instance("p1")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();

        assert_eq!(ids, vec!["created", "task"]);
    }

    #[tokio::test]
    async fn test_reject_empty_and_oversized() {
        let (service, _store) = service(AuditConfig { max_batch_size: 1 });

        assert!(matches!(
            service.record_batch(vec![]).await,
            Err(AuditError::EmptyBatch)
        ));

        let batch = (0..2)
            .map(|i| {
                event(
                    &format!("e{i}"),
                    EventPayload::ProcessCreated(ProcessInstance::new("p1")),
                    i,
                )
            })
            .collect();
        assert!(matches!(
            service.record_batch(batch).await,
            Err(AuditError::BatchTooLarge { size: 2, max: 1 })
        ));
    }
}
