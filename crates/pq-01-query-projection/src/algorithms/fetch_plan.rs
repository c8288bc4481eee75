//! Fetch Plan Builder
//!
//! Works out which part of the read model a batch will touch so the store
//! can load it in one go instead of entity by entity.

use crate::domain::value_objects::FetchPlan;
use shared_types::{EventPayload, RuntimeEvent};

/// Build the preload plan for a batch.
///
/// The root is the first process instance id found in the batch (envelope
/// first, then the carried entity). Returns `None` when no event names a
/// process instance.
pub fn build_fetch_plan(events: &[RuntimeEvent]) -> Option<FetchPlan> {
    let root = events.iter().find_map(|event| {
        event
            .process_instance_id
            .as_deref()
            .or_else(|| event.payload.process_instance_id())
    })?;

    let mut plan = FetchPlan::new(root);

    for event in events {
        match &event.payload {
            EventPayload::VariableCreated(v)
            | EventPayload::VariableUpdated(v)
            | EventPayload::VariableDeleted(v) => push_distinct(&mut plan.variable_names, &v.name),
            EventPayload::TaskCreated(t)
            | EventPayload::TaskAssigned(t)
            | EventPayload::TaskUpdated(t)
            | EventPayload::TaskActivated(t)
            | EventPayload::TaskSuspended(t)
            | EventPayload::TaskCompleted(t)
            | EventPayload::TaskCancelled(t) => push_distinct(&mut plan.task_ids, &t.id),
            EventPayload::TaskCandidateUserAdded(c) | EventPayload::TaskCandidateUserRemoved(c) => {
                push_distinct(&mut plan.task_ids, &c.task_id)
            }
            EventPayload::TaskCandidateGroupAdded(c)
            | EventPayload::TaskCandidateGroupRemoved(c) => {
                push_distinct(&mut plan.task_ids, &c.task_id)
            }
            EventPayload::ActivityStarted(a)
            | EventPayload::ActivityCompleted(a)
            | EventPayload::ActivityCancelled(a)
            | EventPayload::ActivitySignalReceived(a) => {
                let id = a.activity_id();
                if a.is_service_task() {
                    push_distinct(&mut plan.service_task_ids, &id);
                }
                push_distinct(&mut plan.activity_ids, &id);
            }
            _ => {}
        }
    }

    Some(plan)
}

/// Append `value` unless already present, creating the list on first use.
fn push_distinct(list: &mut Option<Vec<String>>, value: &str) {
    let list = list.get_or_insert_with(Vec::new);
    if !list.iter().any(|existing| existing == value) {
        list.push(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::Association;
    use serde_json::json;
    use shared_types::{
        BpmnActivity, Deployment, ProcessInstance, Task, TaskCandidateUser, VariableInstance,
        SERVICE_TASK_ACTIVITY_TYPE,
    };

    fn activity(element: &str, activity_type: Option<&str>) -> BpmnActivity {
        BpmnActivity {
            element_id: element.to_string(),
            activity_type: activity_type.map(str::to_string),
            process_instance_id: "p1".to_string(),
            execution_id: "x".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_process_instance_means_no_plan() {
        let events = vec![RuntimeEvent::new(EventPayload::ApplicationDeployed(
            Deployment::default(),
        ))];

        assert!(build_fetch_plan(&events).is_none());
        assert!(build_fetch_plan(&[]).is_none());
    }

    #[test]
    fn test_root_is_first_process_instance() {
        let events = vec![
            RuntimeEvent::new(EventPayload::TaskCandidateUserAdded(TaskCandidateUser {
                task_id: "t1".to_string(),
                user_id: "u".to_string(),
            })),
            RuntimeEvent::new(EventPayload::TaskCreated(Task::new("t1").in_process("p2"))),
            RuntimeEvent::new(EventPayload::ProcessCreated(ProcessInstance::new("p3"))),
        ];

        let plan = build_fetch_plan(&events).unwrap();
        assert_eq!(plan.process_instance_id, "p2");
    }

    #[test]
    fn test_envelope_id_wins_over_entity() {
        let mut event =
            RuntimeEvent::new(EventPayload::TaskCreated(Task::new("t1").in_process("p2")));
        event.process_instance_id = Some("root".to_string());

        let plan = build_fetch_plan(&[event]).unwrap();
        assert_eq!(plan.process_instance_id, "root");
    }

    #[test]
    fn test_associations_restricted_to_distinct_ids() {
        let var = |name: &str| {
            RuntimeEvent::new(EventPayload::VariableUpdated(
                VariableInstance::new(name, "integer", json!(1)).in_process("p1"),
            ))
        };
        let events = vec![
            var("a"),
            var("b"),
            var("a"),
            RuntimeEvent::new(EventPayload::TaskCreated(Task::new("t1").in_process("p1"))),
            RuntimeEvent::new(EventPayload::TaskCompleted(Task::new("t1").in_process("p1"))),
        ];

        let plan = build_fetch_plan(&events).unwrap();

        assert_eq!(
            plan.variable_names,
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert_eq!(plan.task_ids, Some(vec!["t1".to_string()]));
        assert_eq!(
            plan.associations(),
            vec![Association::Variables, Association::Tasks]
        );
    }

    #[test]
    fn test_service_tasks_only_for_service_activities() {
        let events = vec![
            RuntimeEvent::new(EventPayload::ActivityStarted(activity("user", None))),
            RuntimeEvent::new(EventPayload::ActivityStarted(activity(
                "call",
                Some(SERVICE_TASK_ACTIVITY_TYPE),
            ))),
        ];

        let plan = build_fetch_plan(&events).unwrap();

        assert_eq!(
            plan.activity_ids,
            Some(vec!["p1:user:x".to_string(), "p1:call:x".to_string()])
        );
        assert_eq!(plan.service_task_ids, Some(vec!["p1:call:x".to_string()]));
        assert!(plan.includes(Association::ServiceTasks));
    }

    #[test]
    fn test_plain_activities_skip_service_tasks() {
        let events = vec![RuntimeEvent::new(EventPayload::ActivityCompleted(
            activity("user", Some("userTask")),
        ))];

        let plan = build_fetch_plan(&events).unwrap();

        assert!(plan.includes(Association::Activities));
        assert!(!plan.includes(Association::ServiceTasks));
        assert!(!plan.includes(Association::Variables));
    }
}
