//! Event Batch Optimizer
//!
//! A batch arrives in broker order, which is not always causal: a variable
//! update can precede the task it belongs to. Sorting by a fixed kind
//! precedence puts every creation ahead of the updates and removals that
//! depend on it, so handlers never see an event for an entity that a later
//! event in the same batch creates.
//!
//! The sort is stable. Events of equal rank keep their delivery order.

use crate::domain::value_objects::{PrecedenceRank, TieBreak, DEFAULT_RANK};
use shared_types::{EventKind, RuntimeEvent};
use tracing::debug;

/// Rank of kinds that have an entry of their own.
fn mapped_rank(kind: EventKind) -> Option<PrecedenceRank> {
    use EventKind::*;

    let rank = match kind {
        ProcessCreated => 0,
        ProcessStarted | ProcessUpdated | ProcessSuspended | ProcessResumed => 1,
        SequenceFlowTaken => 2,
        ActivityStarted => 3,
        IntegrationRequested => 4,
        ActivitySignalReceived => 5,
        ActivityCompleted | ActivityCancelled => 6,
        IntegrationResultReceived | IntegrationErrorReceived => 7,
        TaskCreated => 8,
        TaskCandidateUserAdded | TaskCandidateGroupAdded => 9,
        VariableCreated => 10,
        VariableUpdated => 11,
        VariableDeleted => 12,
        TaskActivated | TaskSuspended | TaskAssigned | TaskUpdated => 13,
        TaskCompleted | TaskCancelled => 14,
        TaskCandidateUserRemoved | TaskCandidateGroupRemoved => 15,
        ProcessCompleted | ProcessCancelled => 16,
        ProcessCandidateStarterUserAdded | ProcessCandidateStarterGroupAdded => 17,
        ProcessCandidateStarterUserRemoved | ProcessCandidateStarterGroupRemoved => 18,
        // Deletion needs a terminal instance
        ProcessDeleted => 19,
        ProcessDeployed | ApplicationDeployed => return None,
    };

    Some(rank)
}

/// Precedence rank of an event kind. Kinds without an entry share
/// [`DEFAULT_RANK`] with `PROCESS_CREATED`.
#[must_use]
pub fn precedence(kind: EventKind) -> PrecedenceRank {
    mapped_rank(kind).unwrap_or(DEFAULT_RANK)
}

/// Whether `kind` has an entry of its own in the precedence table.
#[must_use]
pub fn is_mapped(kind: EventKind) -> bool {
    mapped_rank(kind).is_some()
}

/// Reorders event batches into a safe application order.
#[derive(Clone, Copy, Debug, Default)]
pub struct EventBatchOptimizer {
    tie_break: TieBreak,
}

impl EventBatchOptimizer {
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    #[must_use]
    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Stably sort `events` by precedence rank.
    ///
    /// The output is a permutation of the input. Never fails.
    pub fn optimize(&self, mut events: Vec<RuntimeEvent>) -> Vec<RuntimeEvent> {
        match self.tie_break {
            TieBreak::ArrivalOrder => events.sort_by_key(|event| precedence(event.kind())),
            TieBreak::Timestamp => {
                events.sort_by_key(|event| (precedence(event.kind()), event.timestamp))
            }
        }

        debug!(
            events = events.len(),
            tie_break = ?self.tie_break,
            "[pq-01] Batch reordered"
        );

        events
    }
}

/// Reorder with the default policy (delivery order breaks ties).
pub fn optimize(events: Vec<RuntimeEvent>) -> Vec<RuntimeEvent> {
    EventBatchOptimizer::default().optimize(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::invariants::{
        invariant_permutation, invariant_rank_order, invariant_stable_within_rank,
    };
    use proptest::prelude::*;
    use shared_types::{
        BpmnActivity, EventPayload, IntegrationContext, ProcessInstance, SequenceFlow, Task,
        TaskCandidateGroup, TaskCandidateUser, VariableInstance,
    };

    fn kinds(events: &[RuntimeEvent]) -> Vec<EventKind> {
        events.iter().map(RuntimeEvent::kind).collect()
    }

    fn event(kind: EventKind) -> RuntimeEvent {
        let task = || Task::new("t1").in_process("p1");
        let variable = || VariableInstance::new("v", "string", serde_json::json!("x"));
        let activity = || BpmnActivity {
            element_id: "service".to_string(),
            process_instance_id: "p1".to_string(),
            execution_id: "x1".to_string(),
            ..Default::default()
        };
        let integration = || IntegrationContext {
            id: "i1".to_string(),
            process_instance_id: "p1".to_string(),
            ..Default::default()
        };
        let user = || TaskCandidateUser {
            task_id: "t1".to_string(),
            user_id: "u".to_string(),
        };
        let group = || TaskCandidateGroup {
            task_id: "t1".to_string(),
            group_id: "g".to_string(),
        };

        let payload = match kind {
            EventKind::ProcessCreated => EventPayload::ProcessCreated(ProcessInstance::new("p1")),
            EventKind::ProcessResumed => EventPayload::ProcessResumed(ProcessInstance::new("p1")),
            EventKind::ProcessSuspended => {
                EventPayload::ProcessSuspended(ProcessInstance::new("p1"))
            }
            EventKind::ProcessCompleted => {
                EventPayload::ProcessCompleted(ProcessInstance::new("p1"))
            }
            EventKind::ProcessDeleted => EventPayload::ProcessDeleted(ProcessInstance::new("p1")),
            EventKind::ProcessDeployed => EventPayload::ProcessDeployed(Default::default()),
            EventKind::TaskCreated => EventPayload::TaskCreated(task()),
            EventKind::TaskAssigned => EventPayload::TaskAssigned(task()),
            EventKind::TaskUpdated => EventPayload::TaskUpdated(task()),
            EventKind::TaskCompleted => EventPayload::TaskCompleted(task()),
            EventKind::TaskCancelled => EventPayload::TaskCancelled(task()),
            EventKind::TaskCandidateUserAdded => EventPayload::TaskCandidateUserAdded(user()),
            EventKind::TaskCandidateUserRemoved => EventPayload::TaskCandidateUserRemoved(user()),
            EventKind::TaskCandidateGroupAdded => EventPayload::TaskCandidateGroupAdded(group()),
            EventKind::TaskCandidateGroupRemoved => {
                EventPayload::TaskCandidateGroupRemoved(group())
            }
            EventKind::VariableCreated => EventPayload::VariableCreated(variable()),
            EventKind::VariableUpdated => EventPayload::VariableUpdated(variable()),
            EventKind::VariableDeleted => EventPayload::VariableDeleted(variable()),
            EventKind::ActivityStarted => EventPayload::ActivityStarted(activity()),
            EventKind::ActivityCompleted => EventPayload::ActivityCompleted(activity()),
            EventKind::ActivityCancelled => EventPayload::ActivityCancelled(activity()),
            EventKind::ActivitySignalReceived => EventPayload::ActivitySignalReceived(activity()),
            EventKind::SequenceFlowTaken => EventPayload::SequenceFlowTaken(SequenceFlow {
                element_id: "flow".to_string(),
                process_instance_id: "p1".to_string(),
                ..Default::default()
            }),
            EventKind::IntegrationRequested => EventPayload::IntegrationRequested(integration()),
            EventKind::IntegrationResultReceived => {
                EventPayload::IntegrationResultReceived(integration())
            }
            EventKind::IntegrationErrorReceived => {
                EventPayload::IntegrationErrorReceived(integration())
            }
            other => panic!("no fixture for {other}"),
        };

        RuntimeEvent::new(payload)
    }

    fn events(kinds: &[EventKind]) -> Vec<RuntimeEvent> {
        kinds.iter().copied().map(event).collect()
    }

    #[test]
    fn test_variable_events_follow_task_creation() {
        use EventKind::*;
        let input = events(&[VariableCreated, TaskCreated, VariableDeleted, VariableUpdated]);

        let output = optimize(input);

        assert_eq!(
            kinds(&output),
            vec![TaskCreated, VariableCreated, VariableUpdated, VariableDeleted]
        );
    }

    #[test]
    fn test_task_lifecycle_ordering() {
        use EventKind::*;
        let input = events(&[
            TaskCandidateUserAdded,
            TaskCandidateGroupAdded,
            TaskCreated,
            TaskAssigned,
            TaskUpdated,
            TaskCandidateUserRemoved,
            TaskCandidateGroupRemoved,
            TaskCompleted,
            TaskCancelled,
        ]);

        let output = optimize(input);

        assert_eq!(
            kinds(&output),
            vec![
                TaskCreated,
                TaskCandidateUserAdded,
                TaskCandidateGroupAdded,
                TaskAssigned,
                TaskUpdated,
                TaskCompleted,
                TaskCancelled,
                TaskCandidateUserRemoved,
                TaskCandidateGroupRemoved,
            ]
        );
    }

    #[test]
    fn test_service_task_ordering() {
        use EventKind::*;
        let input = events(&[
            IntegrationRequested,
            SequenceFlowTaken,
            ActivityStarted,
            IntegrationResultReceived,
            IntegrationErrorReceived,
            ActivityCompleted,
            ActivityCancelled,
            ActivitySignalReceived,
        ]);

        let output = optimize(input);

        assert_eq!(
            kinds(&output),
            vec![
                SequenceFlowTaken,
                ActivityStarted,
                IntegrationRequested,
                ActivitySignalReceived,
                ActivityCompleted,
                ActivityCancelled,
                IntegrationResultReceived,
                IntegrationErrorReceived,
            ]
        );
    }

    #[test]
    fn test_empty_batch() {
        assert!(optimize(vec![]).is_empty());
    }

    #[test]
    fn test_single_event() {
        let input = events(&[EventKind::TaskCompleted]);
        let output = optimize(input.clone());
        assert_eq!(output, input);
    }

    #[test]
    fn test_already_ordered_input_unchanged() {
        use EventKind::*;
        let input = events(&[ProcessCreated, TaskCreated, VariableCreated, TaskCompleted]);

        assert_eq!(optimize(input.clone()), input);
    }

    #[test]
    fn test_unmapped_kind_shares_front_rank() {
        use EventKind::*;
        let input = events(&[TaskCreated, ProcessDeployed, ProcessCreated]);

        let output = optimize(input);

        // Rank 0 together, in delivery order
        assert_eq!(kinds(&output), vec![ProcessDeployed, ProcessCreated, TaskCreated]);
    }

    #[test]
    fn test_delete_follows_completion() {
        use EventKind::*;
        let input = events(&[ProcessDeleted, TaskCreated, ProcessCompleted, ProcessCreated]);

        let output = optimize(input);

        assert_eq!(
            kinds(&output),
            vec![ProcessCreated, TaskCreated, ProcessCompleted, ProcessDeleted]
        );
    }

    #[test]
    fn test_resume_keeps_order_with_suspend() {
        use EventKind::*;
        let input = events(&[ProcessSuspended, ProcessResumed, ProcessCreated]);

        let output = optimize(input);

        assert_eq!(
            kinds(&output),
            vec![ProcessCreated, ProcessSuspended, ProcessResumed]
        );
    }

    #[test]
    fn test_mapped_kinds() {
        assert!(is_mapped(EventKind::ProcessCreated));
        assert!(is_mapped(EventKind::ProcessCandidateStarterGroupRemoved));
        assert!(is_mapped(EventKind::ProcessResumed));
        assert!(!is_mapped(EventKind::ApplicationDeployed));
        assert_eq!(precedence(EventKind::ProcessDeleted), 19);
        assert_eq!(precedence(EventKind::ProcessDeployed), DEFAULT_RANK);
        assert_eq!(precedence(EventKind::ProcessCandidateStarterUserRemoved), 18);
    }

    #[test]
    fn test_equal_rank_keeps_delivery_order() {
        let first = event(EventKind::TaskAssigned).with_id("first");
        let second = event(EventKind::TaskUpdated).with_id("second");
        let third = event(EventKind::TaskAssigned).with_id("third");

        let output = optimize(vec![first, second, third]);

        let ids: Vec<_> = output.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_timestamp_tie_break() {
        let optimizer = EventBatchOptimizer::new(TieBreak::Timestamp);
        let late = event(EventKind::TaskAssigned)
            .with_id("late")
            .with_timestamp(200);
        let early = event(EventKind::TaskUpdated)
            .with_id("early")
            .with_timestamp(100);
        let created = event(EventKind::TaskCreated)
            .with_id("created")
            .with_timestamp(300);

        let output = optimizer.optimize(vec![late, early, created]);

        let ids: Vec<_> = output.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["created", "early", "late"]);
    }

    fn any_kind() -> impl Strategy<Value = EventKind> {
        use EventKind::*;
        prop::sample::select(vec![
            ProcessCreated,
            ProcessResumed,
            ProcessDeleted,
            TaskCreated,
            TaskAssigned,
            TaskUpdated,
            TaskCompleted,
            TaskCancelled,
            TaskCandidateUserAdded,
            TaskCandidateUserRemoved,
            TaskCandidateGroupAdded,
            TaskCandidateGroupRemoved,
            VariableCreated,
            VariableUpdated,
            VariableDeleted,
            ActivityStarted,
            ActivityCompleted,
            ActivityCancelled,
            ActivitySignalReceived,
            SequenceFlowTaken,
            IntegrationRequested,
            IntegrationResultReceived,
            IntegrationErrorReceived,
        ])
    }

    fn rank_of(event: &RuntimeEvent) -> PrecedenceRank {
        precedence(event.kind())
    }

    proptest! {
        #[test]
        fn prop_output_is_permutation(kinds in prop::collection::vec(any_kind(), 0..40)) {
            let input: Vec<_> = kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| event(*kind).with_id(format!("e{i}")))
                .collect();

            let output = optimize(input.clone());

            prop_assert!(invariant_permutation(&input, &output));
            prop_assert!(invariant_rank_order(&output, rank_of));
        }

        #[test]
        fn prop_equal_ranks_keep_order(kinds in prop::collection::vec(any_kind(), 0..40)) {
            let input: Vec<_> = kinds
                .iter()
                .enumerate()
                .map(|(i, kind)| event(*kind).with_id(format!("e{i}")))
                .collect();

            let output = optimize(input.clone());

            prop_assert!(invariant_stable_within_rank(&input, &output, rank_of));
        }

        #[test]
        fn prop_optimize_is_idempotent(kinds in prop::collection::vec(any_kind(), 0..40)) {
            let input: Vec<_> = kinds.iter().map(|kind| event(*kind)).collect();

            let once = optimize(input);
            let twice = optimize(once.clone());

            prop_assert_eq!(once, twice);
        }
    }
}
