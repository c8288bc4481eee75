//! Handler Context
//!
//! Maps each event kind to the one handler that applies it.

use crate::application::handlers::{default_handlers, QueryEventHandler};
use crate::domain::errors::{QueryEventError, RegistryError};
use crate::domain::value_objects::Dispatch;
use crate::ports::outbound::QueryEntityStore;
use shared_types::{EventKind, RuntimeEvent};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Dispatch registry from event kind to handler.
#[derive(Default)]
pub struct QueryEventHandlerContext {
    handlers: HashMap<EventKind, Arc<dyn QueryEventHandler>>,
}

impl QueryEventHandlerContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with the full handler set over `store`.
    pub fn with_default_handlers(
        store: Arc<dyn QueryEntityStore>,
    ) -> Result<Self, RegistryError> {
        let mut context = Self::new();
        for handler in default_handlers(store) {
            context.register(handler)?;
        }
        Ok(context)
    }

    /// Register `handler` for every kind it declares.
    ///
    /// Nothing is registered if any of its kinds is already taken.
    pub fn register(&mut self, handler: Arc<dyn QueryEventHandler>) -> Result<(), RegistryError> {
        if let Some(kind) = handler
            .handled_kinds()
            .iter()
            .find(|kind| self.handlers.contains_key(*kind))
        {
            return Err(RegistryError::DuplicateHandler(*kind));
        }

        for kind in handler.handled_kinds() {
            self.handlers.insert(*kind, handler.clone());
        }
        Ok(())
    }

    pub fn handler_for(&self, kind: EventKind) -> Option<&Arc<dyn QueryEventHandler>> {
        self.handlers.get(&kind)
    }

    /// Registered kinds, sorted.
    pub fn handled_kinds(&self) -> Vec<EventKind> {
        let mut kinds: Vec<_> = self.handlers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    /// Apply one event with its registered handler.
    pub async fn handle(&self, event: &RuntimeEvent) -> Result<Dispatch, QueryEventError> {
        let kind = event.kind();
        match self.handlers.get(&kind) {
            Some(handler) => {
                debug!(
                    event_id = %event.id,
                    handler = handler.name(),
                    "[pq-01] Applying {}",
                    kind
                );
                handler.handle(event).await?;
                Ok(Dispatch::Handled)
            }
            None => {
                debug!(event_id = %event.id, "[pq-01] No handler for {}, skipping", kind);
                Ok(Dispatch::Unhandled)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryQueryStore;
    use crate::application::handlers::{ProcessInstanceHandler, VariableHandler};
    use async_trait::async_trait;
    use shared_types::{BpmnActivity, EventPayload, ProcessInstance};

    fn store() -> Arc<dyn QueryEntityStore> {
        Arc::new(InMemoryQueryStore::new())
    }

    struct ClashingHandler;

    #[async_trait]
    impl QueryEventHandler for ClashingHandler {
        fn name(&self) -> &'static str {
            "ClashingHandler"
        }

        fn handled_kinds(&self) -> &'static [EventKind] {
            &[EventKind::TaskCreated, EventKind::VariableCreated]
        }

        async fn handle(&self, _event: &RuntimeEvent) -> Result<(), QueryEventError> {
            Ok(())
        }
    }

    #[test]
    fn test_register_duplicate_kind_rejected() {
        let mut context = QueryEventHandlerContext::new();
        context
            .register(Arc::new(VariableHandler::new(store())))
            .unwrap();

        let result = context.register(Arc::new(ClashingHandler));

        assert_eq!(
            result,
            Err(RegistryError::DuplicateHandler(EventKind::VariableCreated))
        );
        // Rejected handler left nothing behind
        assert!(context.handler_for(EventKind::TaskCreated).is_none());
    }

    #[test]
    fn test_default_handlers_registered() {
        let context = QueryEventHandlerContext::with_default_handlers(store()).unwrap();

        assert_eq!(context.handled_kinds().len(), EventKind::ALL.len() - 1);
        assert_eq!(
            context.handler_for(EventKind::TaskCandidateUserAdded).map(|h| h.name()),
            Some("TaskCandidateHandler")
        );
    }

    #[tokio::test]
    async fn test_unhandled_event_is_skipped() {
        let context = QueryEventHandlerContext::with_default_handlers(store()).unwrap();
        let event = RuntimeEvent::new(EventPayload::ActivitySignalReceived(
            BpmnActivity::default(),
        ));

        assert_eq!(context.handle(&event).await.unwrap(), Dispatch::Unhandled);
    }

    #[tokio::test]
    async fn test_dispatch_reaches_handler() {
        let store = Arc::new(InMemoryQueryStore::new());
        let mut context = QueryEventHandlerContext::new();
        context
            .register(Arc::new(ProcessInstanceHandler::new(store.clone())))
            .unwrap();

        let event = RuntimeEvent::new(EventPayload::ProcessCreated(ProcessInstance::new("p1")));

        assert_eq!(context.handle(&event).await.unwrap(), Dispatch::Handled);
        assert_eq!(store.process_instance_count(), 1);
    }
}
