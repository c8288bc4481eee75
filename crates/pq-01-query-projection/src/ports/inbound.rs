//! Inbound Ports (Driving Ports / API)

use crate::domain::errors::QueryEventError;
use crate::domain::value_objects::{BatchOutcome, FetchPlan};
use async_trait::async_trait;
use shared_types::RuntimeEvent;

/// Primary query projection API
#[async_trait]
pub trait QueryEventApi: Send + Sync {
    /// Apply a batch of events to the read model.
    ///
    /// This is the main entry point. It:
    /// 1. Validates the batch size
    /// 2. Preloads the entities the batch touches
    /// 3. Reorders the batch into a safe application order
    /// 4. Dispatches every event inside one store batch
    ///
    /// Either every event is applied or none is.
    async fn handle_batch(&self, events: Vec<RuntimeEvent>)
        -> Result<BatchOutcome, QueryEventError>;

    /// Reorder a batch without applying it.
    fn optimize(&self, events: Vec<RuntimeEvent>) -> Vec<RuntimeEvent>;

    /// Build the preload plan for a batch without applying it.
    fn fetch_plan(&self, events: &[RuntimeEvent]) -> Option<FetchPlan>;
}
