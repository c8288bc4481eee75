//! Outbound Ports (Driven Ports / SPI)

use crate::domain::entities::AuditEventEntity;
use crate::domain::errors::AuditStoreError;
use async_trait::async_trait;

/// Append-only audit persistence
#[async_trait]
pub trait AuditEventStore: Send + Sync {
    /// Append a record. Returns `false` (and stores nothing) if a record
    /// with the same event id already exists.
    async fn insert(&self, entity: AuditEventEntity) -> Result<bool, AuditStoreError>;

    async fn find(&self, event_id: &str) -> Result<Option<AuditEventEntity>, AuditStoreError>;

    /// Records of one process instance, by timestamp then insertion order.
    async fn find_by_process_instance(
        &self,
        process_instance_id: &str,
    ) -> Result<Vec<AuditEventEntity>, AuditStoreError>;

    async fn count(&self) -> Result<usize, AuditStoreError>;
}
