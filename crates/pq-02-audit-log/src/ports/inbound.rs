//! Inbound Ports (Driving Ports / API)

use crate::domain::entities::AuditOutcome;
use crate::domain::errors::AuditError;
use async_trait::async_trait;
use shared_types::RuntimeEvent;

/// Primary audit API
#[async_trait]
pub trait AuditApi: Send + Sync {
    /// Record every event of a batch. Already recorded event ids are skipped.
    async fn record_batch(&self, events: Vec<RuntimeEvent>) -> Result<AuditOutcome, AuditError>;

    /// A recorded event, converted back to its runtime form.
    async fn find_event(&self, event_id: &str) -> Result<Option<RuntimeEvent>, AuditError>;

    /// Every recorded event of a process instance, oldest first.
    async fn events_for_process_instance(
        &self,
        process_instance_id: &str,
    ) -> Result<Vec<RuntimeEvent>, AuditError>;
}
