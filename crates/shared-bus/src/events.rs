//! # Batch Filters
//!
//! Subscribers narrow the batches they receive by application name and by
//! the event kinds they care about.

use shared_types::{EventBatch, EventKind};

/// Filter for subscribing to specific batches.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Applications to include. Empty means all applications.
    pub app_names: Vec<String>,
    /// A batch matches if it carries at least one of these kinds.
    /// Empty means all kinds.
    pub kinds: Vec<EventKind>,
}

impl EventFilter {
    /// Create a filter that accepts all batches.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Create a filter for batches from specific applications.
    #[must_use]
    pub fn apps(app_names: Vec<String>) -> Self {
        Self {
            app_names,
            kinds: Vec::new(),
        }
    }

    /// Create a filter for batches containing any of the given kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<EventKind>) -> Self {
        Self {
            app_names: Vec::new(),
            kinds,
        }
    }

    /// Check if a batch matches this filter.
    #[must_use]
    pub fn matches(&self, batch: &EventBatch) -> bool {
        let app_match = self.app_names.is_empty() || self.app_names.contains(&batch.app_name);

        let kind_match = self.kinds.is_empty()
            || batch
                .events
                .iter()
                .any(|event| self.kinds.contains(&event.kind()));

        app_match && kind_match
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{EventPayload, ProcessInstance, RuntimeEvent, Task};

    fn batch(app: &str, payloads: Vec<EventPayload>) -> EventBatch {
        EventBatch::new(app, payloads.into_iter().map(RuntimeEvent::new).collect())
    }

    #[test]
    fn test_filter_all() {
        let filter = EventFilter::all();
        assert!(filter.matches(&batch("rb", vec![])));
    }

    #[test]
    fn test_filter_by_app() {
        let filter = EventFilter::apps(vec!["billing".to_string()]);

        assert!(filter.matches(&batch("billing", vec![])));
        assert!(!filter.matches(&batch("hr", vec![])));
    }

    #[test]
    fn test_filter_by_kind() {
        let filter = EventFilter::kinds(vec![EventKind::TaskCreated]);

        let with_task = batch(
            "rb",
            vec![
                EventPayload::ProcessStarted(ProcessInstance::new("p1")),
                EventPayload::TaskCreated(Task::new("t1")),
            ],
        );
        let without_task = batch(
            "rb",
            vec![EventPayload::ProcessStarted(ProcessInstance::new("p1"))],
        );

        assert!(filter.matches(&with_task));
        assert!(!filter.matches(&without_task));
    }
}
