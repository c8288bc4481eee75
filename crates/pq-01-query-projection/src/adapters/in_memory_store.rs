//! In-Memory Query Store Adapter
//!
//! Implements `QueryEntityStore` over plain maps. Batches are isolated by
//! snapshotting the whole read model on `begin_batch`; rollback restores
//! the snapshot.

use crate::domain::entities::{
    ApplicationEntity, BpmnActivityEntity, BpmnSequenceFlowEntity, IntegrationContextEntity,
    ProcessCandidateStarterGroupEntity, ProcessCandidateStarterUserEntity,
    ProcessDefinitionEntity, ProcessInstanceEntity, ProcessVariableEntity,
    TaskCandidateGroupEntity, TaskCandidateUserEntity, TaskEntity, TaskVariableEntity,
};
use crate::domain::errors::StoreError;
use crate::domain::value_objects::FetchPlan;
use crate::ports::outbound::QueryEntityStore;
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tracing::debug;

#[derive(Clone, Default)]
struct ReadModel {
    process_instances: HashMap<String, ProcessInstanceEntity>,
    process_definitions: HashMap<String, ProcessDefinitionEntity>,
    applications: HashMap<String, ApplicationEntity>,
    candidate_starter_users: BTreeSet<ProcessCandidateStarterUserEntity>,
    candidate_starter_groups: BTreeSet<ProcessCandidateStarterGroupEntity>,
    tasks: HashMap<String, TaskEntity>,
    task_candidate_users: BTreeSet<TaskCandidateUserEntity>,
    task_candidate_groups: BTreeSet<TaskCandidateGroupEntity>,
    /// Keyed by (process instance id, name).
    process_variables: HashMap<(String, String), ProcessVariableEntity>,
    /// Keyed by (task id, name).
    task_variables: HashMap<(String, String), TaskVariableEntity>,
    activities: HashMap<String, BpmnActivityEntity>,
    sequence_flows: Vec<BpmnSequenceFlowEntity>,
    integration_contexts: HashMap<String, IntegrationContextEntity>,
}

impl ReadModel {
    fn remove_process_instance(&mut self, id: &str) {
        self.process_instances.remove(id);

        let task_ids: Vec<String> = self
            .tasks
            .values()
            .filter(|t| t.process_instance_id.as_deref() == Some(id))
            .map(|t| t.id.clone())
            .collect();

        for task_id in &task_ids {
            self.tasks.remove(task_id);
        }
        self.task_candidate_users
            .retain(|c| !task_ids.contains(&c.task_id));
        self.task_candidate_groups
            .retain(|c| !task_ids.contains(&c.task_id));
        self.task_variables
            .retain(|(task_id, _), _| !task_ids.contains(task_id));

        self.process_variables.retain(|(pid, _), _| pid != id);
        self.activities.retain(|_, a| a.process_instance_id != id);
        self.sequence_flows.retain(|s| s.process_instance_id != id);
        self.integration_contexts
            .retain(|_, i| i.process_instance_id != id);
    }
}

/// In-memory read model for tests and single-node deployments.
pub struct InMemoryQueryStore {
    state: RwLock<ReadModel>,
    /// Read model as it was when the active batch began.
    snapshot: Mutex<Option<ReadModel>>,
    /// Only the latest plan is kept.
    last_prefetch: Mutex<Option<FetchPlan>>,
    prefetch_count: AtomicU64,
    fail_prefetch: AtomicBool,
}

impl InMemoryQueryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(ReadModel::default()),
            snapshot: Mutex::new(None),
            last_prefetch: Mutex::new(None),
            prefetch_count: AtomicU64::new(0),
            fail_prefetch: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `prefetch` fail (for testing).
    pub fn set_prefetch_failure(&self, fail: bool) {
        self.fail_prefetch.store(fail, Ordering::Relaxed);
    }

    /// The most recent plan accepted by `prefetch`.
    pub fn last_prefetch(&self) -> Option<FetchPlan> {
        self.last_prefetch.lock().clone()
    }

    /// Number of plans accepted by `prefetch`.
    pub fn prefetch_count(&self) -> u64 {
        self.prefetch_count.load(Ordering::Relaxed)
    }

    pub fn is_batch_active(&self) -> bool {
        self.snapshot.lock().is_some()
    }

    pub fn process_instance_count(&self) -> usize {
        self.state.read().process_instances.len()
    }

    pub fn task_count(&self) -> usize {
        self.state.read().tasks.len()
    }

    pub fn process_definition(&self, id: &str) -> Option<ProcessDefinitionEntity> {
        self.state.read().process_definitions.get(id).cloned()
    }

    pub fn application(&self, id: &str) -> Option<ApplicationEntity> {
        self.state.read().applications.get(id).cloned()
    }

    /// Users allowed to start the definition, sorted.
    pub fn candidate_starter_users(&self, process_definition_id: &str) -> Vec<String> {
        self.state
            .read()
            .candidate_starter_users
            .iter()
            .filter(|c| c.process_definition_id == process_definition_id)
            .map(|c| c.user_id.clone())
            .collect()
    }

    pub fn candidate_starter_groups(&self, process_definition_id: &str) -> Vec<String> {
        self.state
            .read()
            .candidate_starter_groups
            .iter()
            .filter(|c| c.process_definition_id == process_definition_id)
            .map(|c| c.group_id.clone())
            .collect()
    }

    /// Candidate users of a task, sorted.
    pub fn task_candidate_users(&self, task_id: &str) -> Vec<String> {
        self.state
            .read()
            .task_candidate_users
            .iter()
            .filter(|c| c.task_id == task_id)
            .map(|c| c.user_id.clone())
            .collect()
    }

    pub fn task_candidate_groups(&self, task_id: &str) -> Vec<String> {
        self.state
            .read()
            .task_candidate_groups
            .iter()
            .filter(|c| c.task_id == task_id)
            .map(|c| c.group_id.clone())
            .collect()
    }

    /// Variables of a process instance, sorted by name.
    pub fn process_variables(&self, process_instance_id: &str) -> Vec<ProcessVariableEntity> {
        let mut variables: Vec<_> = self
            .state
            .read()
            .process_variables
            .values()
            .filter(|v| v.process_instance_id == process_instance_id)
            .cloned()
            .collect();
        variables.sort_by(|a, b| a.name.cmp(&b.name));
        variables
    }

    /// Sequence flows of a process instance, in the order they were taken.
    pub fn sequence_flows(&self, process_instance_id: &str) -> Vec<BpmnSequenceFlowEntity> {
        self.state
            .read()
            .sequence_flows
            .iter()
            .filter(|s| s.process_instance_id == process_instance_id)
            .cloned()
            .collect()
    }
}

impl Default for InMemoryQueryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QueryEntityStore for InMemoryQueryStore {
    async fn prefetch(&self, plan: &FetchPlan) -> Result<(), StoreError> {
        if self.fail_prefetch.load(Ordering::Relaxed) {
            return Err(StoreError::Backend("prefetch unavailable".to_string()));
        }

        debug!(
            "[pq-01] Prefetching {:?} for process instance {}",
            plan.associations(),
            plan.process_instance_id
        );
        *self.last_prefetch.lock() = Some(plan.clone());
        self.prefetch_count.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn begin_batch(&self) -> Result<(), StoreError> {
        let mut snapshot = self.snapshot.lock();
        if snapshot.is_some() {
            return Err(StoreError::BatchAlreadyActive);
        }
        *snapshot = Some(self.state.read().clone());
        Ok(())
    }

    async fn commit_batch(&self) -> Result<(), StoreError> {
        self.snapshot
            .lock()
            .take()
            .map(|_| ())
            .ok_or(StoreError::NoActiveBatch)
    }

    async fn rollback_batch(&self) -> Result<(), StoreError> {
        let previous = self
            .snapshot
            .lock()
            .take()
            .ok_or(StoreError::NoActiveBatch)?;
        *self.state.write() = previous;
        Ok(())
    }

    async fn find_process_instance(
        &self,
        id: &str,
    ) -> Result<Option<ProcessInstanceEntity>, StoreError> {
        Ok(self.state.read().process_instances.get(id).cloned())
    }

    async fn save_process_instance(&self, entity: ProcessInstanceEntity) -> Result<(), StoreError> {
        self.state
            .write()
            .process_instances
            .insert(entity.id.clone(), entity);
        Ok(())
    }

    async fn delete_process_instance(&self, id: &str) -> Result<(), StoreError> {
        self.state.write().remove_process_instance(id);
        Ok(())
    }

    async fn save_process_definition(
        &self,
        entity: ProcessDefinitionEntity,
    ) -> Result<(), StoreError> {
        self.state
            .write()
            .process_definitions
            .insert(entity.id.clone(), entity);
        Ok(())
    }

    async fn save_application(&self, entity: ApplicationEntity) -> Result<(), StoreError> {
        self.state
            .write()
            .applications
            .insert(entity.id.clone(), entity);
        Ok(())
    }

    async fn add_candidate_starter_user(
        &self,
        entity: ProcessCandidateStarterUserEntity,
    ) -> Result<bool, StoreError> {
        Ok(self.state.write().candidate_starter_users.insert(entity))
    }

    async fn remove_candidate_starter_user(
        &self,
        entity: &ProcessCandidateStarterUserEntity,
    ) -> Result<bool, StoreError> {
        Ok(self.state.write().candidate_starter_users.remove(entity))
    }

    async fn add_candidate_starter_group(
        &self,
        entity: ProcessCandidateStarterGroupEntity,
    ) -> Result<bool, StoreError> {
        Ok(self.state.write().candidate_starter_groups.insert(entity))
    }

    async fn remove_candidate_starter_group(
        &self,
        entity: &ProcessCandidateStarterGroupEntity,
    ) -> Result<bool, StoreError> {
        Ok(self.state.write().candidate_starter_groups.remove(entity))
    }

    async fn find_task(&self, id: &str) -> Result<Option<TaskEntity>, StoreError> {
        Ok(self.state.read().tasks.get(id).cloned())
    }

    async fn save_task(&self, entity: TaskEntity) -> Result<(), StoreError> {
        self.state.write().tasks.insert(entity.id.clone(), entity);
        Ok(())
    }

    async fn tasks_for_process_instance(
        &self,
        process_instance_id: &str,
    ) -> Result<Vec<TaskEntity>, StoreError> {
        let mut tasks: Vec<_> = self
            .state
            .read()
            .tasks
            .values()
            .filter(|t| t.process_instance_id.as_deref() == Some(process_instance_id))
            .cloned()
            .collect();
        tasks.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(tasks)
    }

    async fn add_task_candidate_user(
        &self,
        entity: TaskCandidateUserEntity,
    ) -> Result<bool, StoreError> {
        Ok(self.state.write().task_candidate_users.insert(entity))
    }

    async fn remove_task_candidate_user(
        &self,
        entity: &TaskCandidateUserEntity,
    ) -> Result<bool, StoreError> {
        Ok(self.state.write().task_candidate_users.remove(entity))
    }

    async fn add_task_candidate_group(
        &self,
        entity: TaskCandidateGroupEntity,
    ) -> Result<bool, StoreError> {
        Ok(self.state.write().task_candidate_groups.insert(entity))
    }

    async fn remove_task_candidate_group(
        &self,
        entity: &TaskCandidateGroupEntity,
    ) -> Result<bool, StoreError> {
        Ok(self.state.write().task_candidate_groups.remove(entity))
    }

    async fn find_process_variable(
        &self,
        process_instance_id: &str,
        name: &str,
    ) -> Result<Option<ProcessVariableEntity>, StoreError> {
        let key = (process_instance_id.to_string(), name.to_string());
        Ok(self.state.read().process_variables.get(&key).cloned())
    }

    async fn save_process_variable(
        &self,
        entity: ProcessVariableEntity,
    ) -> Result<(), StoreError> {
        let key = (entity.process_instance_id.clone(), entity.name.clone());
        self.state.write().process_variables.insert(key, entity);
        Ok(())
    }

    async fn delete_process_variable(
        &self,
        process_instance_id: &str,
        name: &str,
    ) -> Result<bool, StoreError> {
        let key = (process_instance_id.to_string(), name.to_string());
        Ok(self.state.write().process_variables.remove(&key).is_some())
    }

    async fn find_task_variable(
        &self,
        task_id: &str,
        name: &str,
    ) -> Result<Option<TaskVariableEntity>, StoreError> {
        let key = (task_id.to_string(), name.to_string());
        Ok(self.state.read().task_variables.get(&key).cloned())
    }

    async fn save_task_variable(&self, entity: TaskVariableEntity) -> Result<(), StoreError> {
        let key = (entity.task_id.clone(), entity.name.clone());
        self.state.write().task_variables.insert(key, entity);
        Ok(())
    }

    async fn delete_task_variable(&self, task_id: &str, name: &str) -> Result<bool, StoreError> {
        let key = (task_id.to_string(), name.to_string());
        Ok(self.state.write().task_variables.remove(&key).is_some())
    }

    async fn find_activity(&self, id: &str) -> Result<Option<BpmnActivityEntity>, StoreError> {
        Ok(self.state.read().activities.get(id).cloned())
    }

    async fn save_activity(&self, entity: BpmnActivityEntity) -> Result<(), StoreError> {
        self.state
            .write()
            .activities
            .insert(entity.id.clone(), entity);
        Ok(())
    }

    async fn save_sequence_flow(&self, entity: BpmnSequenceFlowEntity) -> Result<(), StoreError> {
        self.state.write().sequence_flows.push(entity);
        Ok(())
    }

    async fn find_integration_context(
        &self,
        id: &str,
    ) -> Result<Option<IntegrationContextEntity>, StoreError> {
        Ok(self.state.read().integration_contexts.get(id).cloned())
    }

    async fn save_integration_context(
        &self,
        entity: IntegrationContextEntity,
    ) -> Result<(), StoreError> {
        self.state
            .write()
            .integration_contexts
            .insert(entity.id.clone(), entity);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::event_date;
    use shared_types::TaskStatus;

    fn task(id: &str, process_instance_id: &str) -> TaskEntity {
        TaskEntity {
            id: id.to_string(),
            name: None,
            description: None,
            assignee: None,
            owner: None,
            priority: 0,
            app_name: None,
            process_instance_id: Some(process_instance_id.to_string()),
            process_definition_id: None,
            process_definition_version: None,
            business_key: None,
            task_definition_key: None,
            parent_task_id: None,
            form_key: None,
            status: TaskStatus::Created,
            due_date: None,
            created_date: event_date(0),
            claimed_date: None,
            completed_date: None,
            completed_by: None,
            duration: None,
            last_modified: event_date(0),
        }
    }

    #[tokio::test]
    async fn test_rollback_restores_snapshot() {
        let store = InMemoryQueryStore::new();
        store.save_task(task("t0", "p1")).await.unwrap();

        store.begin_batch().await.unwrap();
        store.save_task(task("t1", "p1")).await.unwrap();
        assert_eq!(store.task_count(), 2);

        store.rollback_batch().await.unwrap();

        assert_eq!(store.task_count(), 1);
        assert!(store.find_task("t1").await.unwrap().is_none());
        assert!(!store.is_batch_active());
    }

    #[tokio::test]
    async fn test_commit_keeps_writes() {
        let store = InMemoryQueryStore::new();

        store.begin_batch().await.unwrap();
        store.save_task(task("t1", "p1")).await.unwrap();
        store.commit_batch().await.unwrap();

        assert!(store.find_task("t1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_batch_control_errors() {
        let store = InMemoryQueryStore::new();

        assert_eq!(store.commit_batch().await, Err(StoreError::NoActiveBatch));
        assert_eq!(store.rollback_batch().await, Err(StoreError::NoActiveBatch));

        store.begin_batch().await.unwrap();
        assert_eq!(
            store.begin_batch().await,
            Err(StoreError::BatchAlreadyActive)
        );
    }

    #[tokio::test]
    async fn test_candidate_links_are_sets() {
        let store = InMemoryQueryStore::new();
        let link = TaskCandidateUserEntity {
            task_id: "t1".to_string(),
            user_id: "alice".to_string(),
        };

        assert!(store.add_task_candidate_user(link.clone()).await.unwrap());
        assert!(!store.add_task_candidate_user(link.clone()).await.unwrap());
        assert_eq!(store.task_candidate_users("t1"), vec!["alice".to_string()]);

        assert!(store.remove_task_candidate_user(&link).await.unwrap());
        assert!(!store.remove_task_candidate_user(&link).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_process_instance_cascades() {
        let store = InMemoryQueryStore::new();
        store.save_task(task("t1", "p1")).await.unwrap();
        store.save_task(task("t2", "p2")).await.unwrap();
        store
            .add_task_candidate_user(TaskCandidateUserEntity {
                task_id: "t1".to_string(),
                user_id: "alice".to_string(),
            })
            .await
            .unwrap();

        store.delete_process_instance("p1").await.unwrap();

        assert!(store.find_task("t1").await.unwrap().is_none());
        assert!(store.find_task("t2").await.unwrap().is_some());
        assert!(store.task_candidate_users("t1").is_empty());
    }

    #[tokio::test]
    async fn test_prefetch_keeps_latest_plan() {
        let store = InMemoryQueryStore::new();

        store.prefetch(&FetchPlan::new("p1")).await.unwrap();
        assert_eq!(store.last_prefetch(), Some(FetchPlan::new("p1")));

        store.set_prefetch_failure(true);
        assert!(store.prefetch(&FetchPlan::new("p2")).await.is_err());
        assert_eq!(store.last_prefetch(), Some(FetchPlan::new("p1")));
        assert_eq!(store.prefetch_count(), 1);
    }

    #[tokio::test]
    async fn test_prefetch_history_not_retained() {
        let store = InMemoryQueryStore::new();

        for i in 0..500 {
            store.prefetch(&FetchPlan::new(format!("p{i}"))).await.unwrap();
        }

        assert_eq!(store.prefetch_count(), 500);
        assert_eq!(store.last_prefetch(), Some(FetchPlan::new("p499")));
    }
}
