//! # Query Runtime
//!
//! Owns the event bus, both subsystems and their stores, and the consumer
//! tasks that connect them.
//!
//! ```text
//! engine ──EventBatch──▶ InMemoryEventBus ──┬──▶ ProjectionConsumer ─▶ pq-01
//!                                            └──▶ AuditConsumer ──────▶ pq-02
//! ```

use crate::config::RuntimeConfig;
use crate::consumers::{AuditConsumer, ProjectionConsumer};
use pq_01_query_projection::{
    InMemoryQueryStore, QueryConsumerHandler, QueryProjectionService, RegistryError,
};
use pq_02_audit_log::{AuditConsumerHandler, AuditService, InMemoryAuditEventStore};
use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus};
use shared_types::EventBatch;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// How long `shutdown` waits for each consumer task.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Runtime startup errors.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Handler registration failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("Failed to read replay file {path:?}: {source}")]
    ReplayRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Replay file {path:?} is not a JSON array of event batches: {source}")]
    ReplayDecode {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// The process query service runtime.
pub struct QueryRuntime {
    config: RuntimeConfig,
    bus: Arc<InMemoryEventBus>,
    query_store: Arc<InMemoryQueryStore>,
    audit_store: Arc<InMemoryAuditEventStore>,
    projection: Arc<QueryConsumerHandler>,
    audit: Arc<AuditConsumerHandler>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl QueryRuntime {
    /// Build the bus, stores and subsystems. Nothing runs until `start`.
    pub fn new(config: RuntimeConfig) -> Result<Self, RuntimeError> {
        info!("Creating process query runtime");

        let bus = Arc::new(InMemoryEventBus::with_capacity(config.bus_capacity));

        let query_store = Arc::new(InMemoryQueryStore::new());
        let projection_service =
            QueryProjectionService::with_store(config.projection.clone(), query_store.clone())?;
        let projection = Arc::new(QueryConsumerHandler::new(projection_service));

        let audit_store = Arc::new(InMemoryAuditEventStore::new());
        let audit_service = AuditService::new(config.audit.clone(), audit_store.clone());
        let audit = Arc::new(AuditConsumerHandler::new(audit_service));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Ok(Self {
            config,
            bus,
            query_store,
            audit_store,
            projection,
            audit,
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        })
    }

    /// Start the consumers and replay the configured file (if any).
    ///
    /// Returns the number of replayed batches.
    pub async fn start(&mut self) -> Result<usize, RuntimeError> {
        info!("===========================================");
        info!("  Process Query Runtime v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        self.start_consumers();

        let replayed = match self.config.replay_file.clone() {
            Some(path) => self.replay(&path).await?,
            None => 0,
        };

        info!(
            "Consumers running (bus capacity {}, apps {:?})",
            self.config.bus_capacity, self.config.app_names
        );
        Ok(replayed)
    }

    fn filter(&self) -> EventFilter {
        if self.config.app_names.is_empty() {
            EventFilter::all()
        } else {
            EventFilter::apps(self.config.app_names.clone())
        }
    }

    fn start_consumers(&mut self) {
        let projection = ProjectionConsumer::new(
            self.bus.subscribe(self.filter()),
            Arc::clone(&self.projection),
        );
        let mut projection_shutdown = self.shutdown_rx.clone();
        self.tasks.push(tokio::spawn(async move {
            tokio::select! {
                _ = projection.run() => {}
                _ = projection_shutdown.changed() => {
                    info!("[pq-01] Shutdown signal received");
                }
            }
        }));

        let audit = AuditConsumer::new(self.bus.subscribe(self.filter()), Arc::clone(&self.audit));
        let mut audit_shutdown = self.shutdown_rx.clone();
        self.tasks.push(tokio::spawn(async move {
            tokio::select! {
                _ = audit.run() => {}
                _ = audit_shutdown.changed() => {
                    info!("[pq-02] Shutdown signal received");
                }
            }
        }));
    }

    /// Apply every batch of a JSON file to both subsystems, in file order.
    ///
    /// Batches bypass the bus so a file larger than the bus capacity cannot
    /// lag the consumers. The app-name filter still applies. Returns the
    /// number of batches applied.
    pub async fn replay(&self, path: &Path) -> Result<usize, RuntimeError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| RuntimeError::ReplayRead {
                path: path.to_path_buf(),
                source,
            })?;
        let batches: Vec<EventBatch> =
            serde_json::from_slice(&bytes).map_err(|source| RuntimeError::ReplayDecode {
                path: path.to_path_buf(),
                source,
            })?;

        let filter = self.filter();
        let mut applied = 0;
        for batch in batches {
            if !filter.matches(&batch) {
                debug!(app_name = %batch.app_name, "Replay batch filtered out");
                continue;
            }

            let projected = self.projection.handle_batch(batch.clone()).await;
            if !projected.success {
                warn!(
                    app_name = %projected.app_name,
                    "[pq-01] Replayed batch dropped: {}",
                    projected.error.as_deref().unwrap_or("unknown error")
                );
            }

            let audited = self.audit.handle_batch(batch).await;
            if !audited.success {
                warn!(
                    app_name = %audited.app_name,
                    "[pq-02] Replayed batch not audited: {}",
                    audited.error.as_deref().unwrap_or("unknown error")
                );
            }

            applied += 1;
        }

        info!("Replayed {} batches from {:?}", applied, path);
        Ok(applied)
    }

    /// Publish one batch to the bus. Returns the number of receivers.
    pub async fn publish(&self, batch: EventBatch) -> usize {
        self.bus.publish(batch).await
    }

    /// Shutdown gracefully.
    ///
    /// 1. Signal shutdown to all consumers
    /// 2. Wait (bounded) for each consumer task to stop
    pub async fn shutdown(&mut self) {
        info!("Initiating graceful shutdown...");

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        for task in self.tasks.drain(..) {
            match tokio::time::timeout(SHUTDOWN_TIMEOUT, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Consumer task failed: {}", e),
                Err(_) => warn!("Consumer task did not stop within {:?}", SHUTDOWN_TIMEOUT),
            }
        }

        info!("Shutdown complete");
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn bus(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.bus)
    }

    pub fn query_store(&self) -> Arc<InMemoryQueryStore> {
        Arc::clone(&self.query_store)
    }

    pub fn audit_store(&self) -> Arc<InMemoryAuditEventStore> {
        Arc::clone(&self.audit_store)
    }

    pub fn projection(&self) -> Arc<QueryConsumerHandler> {
        Arc::clone(&self.projection)
    }

    pub fn audit(&self) -> Arc<AuditConsumerHandler> {
        Arc::clone(&self.audit)
    }
}
