//! Event handlers
//!
//! One handler per event family. Each declares the kinds it accepts and
//! applies a single event to the read model through the entity store.

mod activities;
mod candidates;
mod deployment;
mod integration;
mod process;
mod task;
mod task_candidates;
mod variables;

pub use activities::BpmnActivityHandler;
pub use candidates::ProcessCandidateStarterHandler;
pub use deployment::DeploymentHandler;
pub use integration::IntegrationContextHandler;
pub use process::ProcessInstanceHandler;
pub use task::TaskHandler;
pub use task_candidates::TaskCandidateHandler;
pub use variables::VariableHandler;

use crate::domain::errors::QueryEventError;
use crate::ports::outbound::QueryEntityStore;
use async_trait::async_trait;
use shared_types::{EventKind, RuntimeEvent};
use std::sync::Arc;

/// Applies one kind family of events to the read model.
#[async_trait]
pub trait QueryEventHandler: Send + Sync {
    /// Name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Every kind this handler accepts.
    fn handled_kinds(&self) -> &'static [EventKind];

    async fn handle(&self, event: &RuntimeEvent) -> Result<(), QueryEventError>;
}

/// The full handler set, one per family.
///
/// `ACTIVITY_SIGNAL_RECEIVED` has no handler.
pub fn default_handlers(store: Arc<dyn QueryEntityStore>) -> Vec<Arc<dyn QueryEventHandler>> {
    vec![
        Arc::new(ProcessInstanceHandler::new(store.clone())),
        Arc::new(DeploymentHandler::new(store.clone())),
        Arc::new(ProcessCandidateStarterHandler::new(store.clone())),
        Arc::new(TaskHandler::new(store.clone())),
        Arc::new(TaskCandidateHandler::new(store.clone())),
        Arc::new(VariableHandler::new(store.clone())),
        Arc::new(BpmnActivityHandler::new(store.clone())),
        Arc::new(IntegrationContextHandler::new(store)),
    ]
}

fn unexpected(handler: &'static str, event: &RuntimeEvent) -> QueryEventError {
    QueryEventError::UnexpectedPayload {
        handler,
        kind: event.kind(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_default_handlers_cover_disjoint_kinds() {
        let handlers = default_handlers(fixtures::dyn_store(&fixtures::store()));
        let mut seen = HashSet::new();

        for handler in &handlers {
            for kind in handler.handled_kinds() {
                assert!(seen.insert(*kind), "{kind} handled twice");
            }
        }

        let unhandled: Vec<_> = EventKind::ALL
            .iter()
            .filter(|kind| !seen.contains(*kind))
            .collect();
        assert_eq!(unhandled, vec![&EventKind::ActivitySignalReceived]);
    }
}
