//! # Bus Consumers
//!
//! One consumer per subsystem. Each owns a bus subscription and hands every
//! batch it receives to the subsystem's IPC handler, one batch at a time.

use pq_01_query_projection::QueryConsumerHandler;
use pq_02_audit_log::AuditConsumerHandler;
use shared_bus::Subscription;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Feeds engine batches to the query projection.
pub struct ProjectionConsumer {
    subscription: Subscription,
    handler: Arc<QueryConsumerHandler>,
}

impl ProjectionConsumer {
    pub fn new(subscription: Subscription, handler: Arc<QueryConsumerHandler>) -> Self {
        Self {
            subscription,
            handler,
        }
    }

    /// Consume until the bus closes.
    pub async fn run(mut self) {
        info!("[pq-01] Projection consumer started");

        while let Some(batch) = self.subscription.recv().await {
            let response = self.handler.handle_batch(batch).await;
            if response.success {
                debug!(
                    app_name = %response.app_name,
                    handled = response.handled,
                    unhandled = response.unhandled,
                    "[pq-01] Batch consumed"
                );
            } else {
                warn!(
                    app_name = %response.app_name,
                    "[pq-01] Batch dropped: {}",
                    response.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        info!("[pq-01] Event bus closed, projection consumer stopping");
    }
}

/// Feeds engine batches to the audit log.
pub struct AuditConsumer {
    subscription: Subscription,
    handler: Arc<AuditConsumerHandler>,
}

impl AuditConsumer {
    pub fn new(subscription: Subscription, handler: Arc<AuditConsumerHandler>) -> Self {
        Self {
            subscription,
            handler,
        }
    }

    /// Consume until the bus closes.
    pub async fn run(mut self) {
        info!("[pq-02] Audit consumer started");

        while let Some(batch) = self.subscription.recv().await {
            let response = self.handler.handle_batch(batch).await;
            if !response.success {
                warn!(
                    app_name = %response.app_name,
                    "[pq-02] Batch not audited: {}",
                    response.error.as_deref().unwrap_or("unknown error")
                );
            }
        }

        info!("[pq-02] Event bus closed, audit consumer stopping");
    }
}
