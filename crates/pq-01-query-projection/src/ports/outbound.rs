//! Outbound Ports (Driven Ports / SPI)

use crate::domain::entities::{
    ApplicationEntity, BpmnActivityEntity, BpmnSequenceFlowEntity, IntegrationContextEntity,
    ProcessCandidateStarterGroupEntity, ProcessCandidateStarterUserEntity,
    ProcessDefinitionEntity, ProcessInstanceEntity, ProcessVariableEntity,
    TaskCandidateGroupEntity, TaskCandidateUserEntity, TaskEntity, TaskVariableEntity,
};
use crate::domain::errors::StoreError;
use crate::domain::value_objects::FetchPlan;
use async_trait::async_trait;

/// Read-model persistence
///
/// Writes made between `begin_batch` and `commit_batch` become visible
/// together; `rollback_batch` discards them. Reads inside a batch see the
/// batch's own writes.
#[async_trait]
pub trait QueryEntityStore: Send + Sync {
    // -------------------------------------------------------------------------
    // Batch control
    // -------------------------------------------------------------------------

    /// Preload the entities a batch will touch. Advisory.
    async fn prefetch(&self, plan: &FetchPlan) -> Result<(), StoreError>;

    async fn begin_batch(&self) -> Result<(), StoreError>;

    async fn commit_batch(&self) -> Result<(), StoreError>;

    async fn rollback_batch(&self) -> Result<(), StoreError>;

    // -------------------------------------------------------------------------
    // Process instances and definitions
    // -------------------------------------------------------------------------

    async fn find_process_instance(
        &self,
        id: &str,
    ) -> Result<Option<ProcessInstanceEntity>, StoreError>;

    async fn save_process_instance(&self, entity: ProcessInstanceEntity) -> Result<(), StoreError>;

    /// Remove an instance together with its tasks, variables, activities,
    /// sequence flows and integration contexts.
    async fn delete_process_instance(&self, id: &str) -> Result<(), StoreError>;

    async fn save_process_definition(
        &self,
        entity: ProcessDefinitionEntity,
    ) -> Result<(), StoreError>;

    async fn save_application(&self, entity: ApplicationEntity) -> Result<(), StoreError>;

    /// Returns `false` if the link already existed.
    async fn add_candidate_starter_user(
        &self,
        entity: ProcessCandidateStarterUserEntity,
    ) -> Result<bool, StoreError>;

    /// Returns `false` if there was no such link.
    async fn remove_candidate_starter_user(
        &self,
        entity: &ProcessCandidateStarterUserEntity,
    ) -> Result<bool, StoreError>;

    async fn add_candidate_starter_group(
        &self,
        entity: ProcessCandidateStarterGroupEntity,
    ) -> Result<bool, StoreError>;

    async fn remove_candidate_starter_group(
        &self,
        entity: &ProcessCandidateStarterGroupEntity,
    ) -> Result<bool, StoreError>;

    // -------------------------------------------------------------------------
    // Tasks
    // -------------------------------------------------------------------------

    async fn find_task(&self, id: &str) -> Result<Option<TaskEntity>, StoreError>;

    async fn save_task(&self, entity: TaskEntity) -> Result<(), StoreError>;

    async fn tasks_for_process_instance(
        &self,
        process_instance_id: &str,
    ) -> Result<Vec<TaskEntity>, StoreError>;

    async fn add_task_candidate_user(
        &self,
        entity: TaskCandidateUserEntity,
    ) -> Result<bool, StoreError>;

    async fn remove_task_candidate_user(
        &self,
        entity: &TaskCandidateUserEntity,
    ) -> Result<bool, StoreError>;

    async fn add_task_candidate_group(
        &self,
        entity: TaskCandidateGroupEntity,
    ) -> Result<bool, StoreError>;

    async fn remove_task_candidate_group(
        &self,
        entity: &TaskCandidateGroupEntity,
    ) -> Result<bool, StoreError>;

    // -------------------------------------------------------------------------
    // Variables
    // -------------------------------------------------------------------------

    async fn find_process_variable(
        &self,
        process_instance_id: &str,
        name: &str,
    ) -> Result<Option<ProcessVariableEntity>, StoreError>;

    async fn save_process_variable(&self, entity: ProcessVariableEntity)
        -> Result<(), StoreError>;

    /// Returns `false` if there was no such variable.
    async fn delete_process_variable(
        &self,
        process_instance_id: &str,
        name: &str,
    ) -> Result<bool, StoreError>;

    async fn find_task_variable(
        &self,
        task_id: &str,
        name: &str,
    ) -> Result<Option<TaskVariableEntity>, StoreError>;

    async fn save_task_variable(&self, entity: TaskVariableEntity) -> Result<(), StoreError>;

    async fn delete_task_variable(&self, task_id: &str, name: &str) -> Result<bool, StoreError>;

    // -------------------------------------------------------------------------
    // BPMN
    // -------------------------------------------------------------------------

    async fn find_activity(&self, id: &str) -> Result<Option<BpmnActivityEntity>, StoreError>;

    async fn save_activity(&self, entity: BpmnActivityEntity) -> Result<(), StoreError>;

    async fn save_sequence_flow(&self, entity: BpmnSequenceFlowEntity) -> Result<(), StoreError>;

    async fn find_integration_context(
        &self,
        id: &str,
    ) -> Result<Option<IntegrationContextEntity>, StoreError>;

    async fn save_integration_context(
        &self,
        entity: IntegrationContextEntity,
    ) -> Result<(), StoreError>;
}
