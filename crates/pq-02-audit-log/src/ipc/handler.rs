//! IPC Handler for the audit log

use crate::application::service::AuditService;
use crate::domain::errors::AuditError;
use crate::ipc::payloads::AuditResponse;
use crate::ports::inbound::AuditApi;
use shared_types::EventBatch;
use tracing::{error, warn};

/// Broker consumer that audits engine event batches.
pub struct AuditConsumerHandler {
    service: AuditService,
}

impl AuditConsumerHandler {
    pub fn new(service: AuditService) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &AuditService {
        &self.service
    }

    /// Handle a raw broker message (a JSON `EventBatch`).
    pub async fn handle_message(&self, bytes: &[u8]) -> AuditResponse {
        match EventBatch::from_json(bytes) {
            Ok(batch) => self.handle_batch(batch).await,
            Err(e) => {
                let e = AuditError::Decode(e.to_string());
                warn!("[pq-02] Dropping message of {} bytes: {}", bytes.len(), e);
                AuditResponse::rejected(String::new(), e)
            }
        }
    }

    pub async fn handle_batch(&self, batch: EventBatch) -> AuditResponse {
        let EventBatch { app_name, events } = batch;
        match self.service.record_batch(events).await {
            Ok(outcome) => AuditResponse::recorded(app_name, outcome),
            Err(e) => {
                error!("[pq-02] ❌ Audit of batch from {} failed: {}", app_name, e);
                AuditResponse::rejected(app_name, e)
            }
        }
    }
}
