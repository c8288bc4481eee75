//! # Integration Test Flows
//!
//! Tests that the query projection (pq-01) and audit log (pq-02) consume
//! the same engine batches from shared-bus correctly.
//!
//! ## Flows Tested:
//!
//! 1. **Out-of-order delivery**: a batch delivered children-first is
//!    projected as if it had arrived in causal order
//! 2. **Batch atomicity**: a failing batch leaves no read-model trace, yet
//!    is still audited
//! 3. **Service tasks**: activities, sequence flows and integrations over
//!    the JSON wire format
//! 4. **Process completion**: open tasks are cancelled across batches
//! 5. **Subscriptions**: kind-filtered streams see only matching batches

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::time::Duration;
    use tokio::time::timeout;
    use tokio_stream::StreamExt;

    use pq_01_query_projection::{
        build_fetch_plan, optimize, BpmnActivityStatus, IntegrationContextStatus,
        QueryEntityStore,
    };
    use pq_02_audit_log::{AuditApi, AuditEventStore};
    use query_runtime::{QueryRuntime, RuntimeConfig};
    use shared_bus::{EventFilter, EventPublisher, InMemoryEventBus};
    use shared_types::{
        BpmnActivity, EventBatch, EventKind, EventPayload, IntegrationContext, ProcessInstance,
        ProcessInstanceStatus, RuntimeEvent, SequenceFlow, Task, TaskStatus, VariableInstance,
    };

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn event(payload: EventPayload, timestamp: i64) -> RuntimeEvent {
        RuntimeEvent::new(payload)
            .with_app("rb-app")
            .with_timestamp(timestamp)
    }

    fn assigned_task(id: &str) -> Task {
        Task {
            assignee: Some("alice".to_string()),
            ..Task::new(id).in_process("p1")
        }
    }

    async fn started_runtime() -> QueryRuntime {
        let mut runtime = QueryRuntime::new(RuntimeConfig::default()).unwrap();
        runtime.start().await.unwrap();
        runtime
    }

    /// Poll an async condition until it holds or two seconds pass.
    async fn eventually<F, Fut>(condition: F) -> bool
    where
        F: Fn() -> Fut,
        Fut: Future<Output = bool>,
    {
        for _ in 0..200 {
            if condition().await {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    // =============================================================================
    // FLOW 1: OUT-OF-ORDER DELIVERY
    // =============================================================================

    #[tokio::test]
    async fn test_reversed_lifecycle_batch_is_projected() {
        let mut runtime = started_runtime().await;

        // Full lifecycle, delivered newest first
        let batch = EventBatch::new(
            "rb-app",
            vec![
                event(EventPayload::TaskCompleted(assigned_task("t1")), 7),
                event(
                    EventPayload::VariableUpdated(
                        VariableInstance::new("amount", "integer", serde_json::json!(2))
                            .in_process("p1"),
                    ),
                    6,
                ),
                event(EventPayload::TaskAssigned(assigned_task("t1")), 5),
                event(
                    EventPayload::VariableCreated(
                        VariableInstance::new("amount", "integer", serde_json::json!(1))
                            .in_process("p1"),
                    ),
                    4,
                ),
                event(EventPayload::TaskCreated(Task::new("t1").in_process("p1")), 3),
                event(EventPayload::ProcessStarted(ProcessInstance::new("p1")), 2),
                event(EventPayload::ProcessCreated(ProcessInstance::new("p1")), 1),
            ],
        );
        runtime.publish(batch).await;

        let store = runtime.query_store();
        assert!(
            eventually(|| {
                let store = store.clone();
                async move { store.task_count() == 1 }
            })
            .await
        );

        let task = store.find_task("t1").await.unwrap().unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.completed_by.as_deref(), Some("alice"));
        assert_eq!(task.duration, Some(4));

        let process = store.find_process_instance("p1").await.unwrap().unwrap();
        assert_eq!(process.status, ProcessInstanceStatus::Running);

        let variables = store.process_variables("p1");
        assert_eq!(variables.len(), 1);
        assert_eq!(variables[0].value, serde_json::json!(2));

        // Audit keeps every event, independent of projection order
        let audit_store = runtime.audit_store();
        assert!(
            eventually(|| {
                let audit_store = audit_store.clone();
                async move { audit_store.count().await.unwrap() == 7 }
            })
            .await
        );

        runtime.shutdown().await;
    }

    // =============================================================================
    // FLOW 2: BATCH ATOMICITY
    // =============================================================================

    #[tokio::test]
    async fn test_failed_batch_rolled_back_but_audited() {
        let mut runtime = started_runtime().await;

        let failing = EventBatch::new(
            "rb-app",
            vec![
                event(EventPayload::ProcessCreated(ProcessInstance::new("p-bad")), 1),
                event(EventPayload::TaskAssigned(Task::new("ghost")), 2),
            ],
        );
        let valid = EventBatch::new(
            "rb-app",
            vec![event(
                EventPayload::ProcessCreated(ProcessInstance::new("p-good")),
                3,
            )],
        );
        runtime.publish(failing).await;
        runtime.publish(valid).await;

        // Batches are consumed in order, so the valid one lands last
        let store = runtime.query_store();
        assert!(
            eventually(|| {
                let store = store.clone();
                async move { store.process_instance_count() == 1 }
            })
            .await
        );
        assert!(store
            .find_process_instance("p-bad")
            .await
            .unwrap()
            .is_none());
        assert!(!store.is_batch_active());

        let audit_store = runtime.audit_store();
        assert!(
            eventually(|| {
                let audit_store = audit_store.clone();
                async move { audit_store.count().await.unwrap() == 3 }
            })
            .await
        );

        runtime.shutdown().await;
    }

    // =============================================================================
    // FLOW 3: SERVICE TASKS OVER THE WIRE
    // =============================================================================

    #[tokio::test]
    async fn test_service_task_batch_from_wire() {
        let runtime = QueryRuntime::new(RuntimeConfig::default()).unwrap();
        let projection = runtime.projection();

        let activity = BpmnActivity {
            element_id: "callConnector".to_string(),
            activity_type: Some("serviceTask".to_string()),
            process_instance_id: "p1".to_string(),
            execution_id: "x1".to_string(),
            ..Default::default()
        };
        let context = IntegrationContext {
            id: "i1".to_string(),
            process_instance_id: "p1".to_string(),
            client_id: "callConnector".to_string(),
            ..Default::default()
        };
        let flow = SequenceFlow {
            element_id: "toConnector".to_string(),
            target_activity_element_id: Some("callConnector".to_string()),
            process_instance_id: "p1".to_string(),
            ..Default::default()
        };

        let events = vec![
            event(EventPayload::IntegrationRequested(context.clone()), 1),
            event(EventPayload::SequenceFlowTaken(flow), 2),
            event(EventPayload::ActivityStarted(activity.clone()), 3),
            event(EventPayload::IntegrationResultReceived(context.clone()), 4),
            event(EventPayload::IntegrationErrorReceived(context), 5),
            event(EventPayload::ActivityCompleted(activity.clone()), 6),
            event(EventPayload::ActivityCancelled(activity.clone()), 7),
            event(EventPayload::ActivitySignalReceived(activity), 8),
        ];

        let kinds: Vec<_> = optimize(events.clone())
            .iter()
            .map(RuntimeEvent::kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                EventKind::SequenceFlowTaken,
                EventKind::ActivityStarted,
                EventKind::IntegrationRequested,
                EventKind::ActivitySignalReceived,
                EventKind::ActivityCompleted,
                EventKind::ActivityCancelled,
                EventKind::IntegrationResultReceived,
                EventKind::IntegrationErrorReceived,
            ]
        );

        let bytes = EventBatch::new("rb-app", events).to_json().unwrap();
        let response = projection.handle_message(&bytes).await;

        assert!(response.success, "{:?}", response.error);
        assert_eq!(response.handled, 7);
        assert_eq!(response.unhandled, 1);

        let store = runtime.query_store();
        let stored = store
            .find_activity("p1:callConnector:x1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, BpmnActivityStatus::Cancelled);
        assert!(stored.completed_date.is_some());
        assert!(stored.cancelled_date.is_some());

        let integration = store.find_integration_context("i1").await.unwrap().unwrap();
        assert_eq!(
            integration.status,
            IntegrationContextStatus::IntegrationErrorReceived
        );
        assert_eq!(store.sequence_flows("p1").len(), 1);

        // The batch touched activities and service tasks of p1 only
        let plan = build_fetch_plan(&EventBatch::from_json(&bytes).unwrap().events).unwrap();
        assert_eq!(plan.process_instance_id, "p1");
        assert_eq!(
            plan.service_task_ids,
            Some(vec!["p1:callConnector:x1".to_string()])
        );
    }

    // =============================================================================
    // FLOW 4: PROCESS COMPLETION ACROSS BATCHES
    // =============================================================================

    #[tokio::test]
    async fn test_completion_cancels_open_tasks() {
        let mut runtime = started_runtime().await;
        let store = runtime.query_store();

        runtime
            .publish(EventBatch::new(
                "rb-app",
                vec![
                    event(EventPayload::TaskCreated(Task::new("t2").in_process("p1")), 3),
                    event(EventPayload::TaskCreated(Task::new("t1").in_process("p1")), 2),
                    event(EventPayload::ProcessCreated(ProcessInstance::new("p1")), 1),
                ],
            ))
            .await;
        assert!(
            eventually(|| {
                let store = store.clone();
                async move { store.task_count() == 2 }
            })
            .await
        );

        // Process completion delivered before the task completion it follows
        runtime
            .publish(EventBatch::new(
                "rb-app",
                vec![
                    event(EventPayload::ProcessCompleted(ProcessInstance::new("p1")), 5),
                    event(EventPayload::TaskCompleted(Task::new("t1").in_process("p1")), 4),
                ],
            ))
            .await;
        assert!(
            eventually(|| {
                let store = store.clone();
                async move {
                    store
                        .find_process_instance("p1")
                        .await
                        .unwrap()
                        .map(|p| p.status == ProcessInstanceStatus::Completed)
                        .unwrap_or(false)
                }
            })
            .await
        );

        let t1 = store.find_task("t1").await.unwrap().unwrap();
        let t2 = store.find_task("t2").await.unwrap().unwrap();
        assert_eq!(t1.status, TaskStatus::Completed);
        assert_eq!(t2.status, TaskStatus::Cancelled);

        // Audit history stays in emission order
        let audit = runtime.audit();
        assert!(
            eventually(|| {
                let audit = audit.clone();
                async move {
                    audit
                        .service()
                        .events_for_process_instance("p1")
                        .await
                        .unwrap()
                        .len()
                        == 5
                }
            })
            .await
        );
        let timestamps: Vec<_> = audit
            .service()
            .events_for_process_instance("p1")
            .await
            .unwrap()
            .iter()
            .map(|e| e.timestamp)
            .collect();
        assert_eq!(timestamps, vec![1, 2, 3, 4, 5]);

        runtime.shutdown().await;
    }

    // =============================================================================
    // FLOW 5: SUBSCRIPTIONS
    // =============================================================================

    #[tokio::test]
    async fn test_kind_filtered_stream() {
        let bus = InMemoryEventBus::new();
        let mut stream = bus.event_stream(EventFilter::kinds(vec![EventKind::TaskCreated]));

        bus.publish(EventBatch::new(
            "rb-app",
            vec![event(EventPayload::ProcessCreated(ProcessInstance::new("p1")), 1)],
        ))
        .await;
        bus.publish(EventBatch::new(
            "rb-app",
            vec![event(EventPayload::TaskCreated(Task::new("t1")), 2)],
        ))
        .await;

        let received = timeout(Duration::from_secs(1), stream.next())
            .await
            .expect("stream timed out")
            .expect("stream ended");

        assert_eq!(received.events.len(), 1);
        assert_eq!(received.events[0].kind(), EventKind::TaskCreated);
    }
}
