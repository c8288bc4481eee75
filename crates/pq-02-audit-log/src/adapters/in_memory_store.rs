//! In-Memory Audit Store Adapter

use crate::domain::entities::AuditEventEntity;
use crate::domain::errors::AuditStoreError;
use crate::ports::outbound::AuditEventStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

#[derive(Default)]
struct AuditLog {
    /// Records in insertion order.
    records: Vec<AuditEventEntity>,
    /// Event id -> index into `records`.
    by_id: HashMap<String, usize>,
}

/// Append-only audit log held in memory.
#[derive(Default)]
pub struct InMemoryAuditEventStore {
    log: RwLock<AuditLog>,
}

impl InMemoryAuditEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditEventStore for InMemoryAuditEventStore {
    async fn insert(&self, entity: AuditEventEntity) -> Result<bool, AuditStoreError> {
        let mut log = self.log.write();
        if log.by_id.contains_key(&entity.event_id) {
            return Ok(false);
        }

        let index = log.records.len();
        log.by_id.insert(entity.event_id.clone(), index);
        log.records.push(entity);
        Ok(true)
    }

    async fn find(&self, event_id: &str) -> Result<Option<AuditEventEntity>, AuditStoreError> {
        let log = self.log.read();
        Ok(log
            .by_id
            .get(event_id)
            .and_then(|&index| log.records.get(index))
            .cloned())
    }

    async fn find_by_process_instance(
        &self,
        process_instance_id: &str,
    ) -> Result<Vec<AuditEventEntity>, AuditStoreError> {
        let mut records: Vec<_> = self
            .log
            .read()
            .records
            .iter()
            .filter(|r| r.process_instance_id.as_deref() == Some(process_instance_id))
            .cloned()
            .collect();
        // Stable: equal timestamps keep insertion order
        records.sort_by_key(|r| r.timestamp);
        Ok(records)
    }

    async fn count(&self) -> Result<usize, AuditStoreError> {
        Ok(self.log.read().records.len())
    }
}
