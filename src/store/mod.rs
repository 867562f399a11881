// Persistence seam. The store's transaction is the single atomicity
// boundary: a status mutation and its history entry commit together or not
// at all.

pub mod sqlite;

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::project::{HistoryEntry, LocationApproval, Project};

pub use sqlite::SqliteProjectStore;

/// Ordering for a project's audit trail: newest-first for display,
/// oldest-first for state replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayOrder {
    NewestFirst,
    OldestFirst,
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Insert a new project together with its creation history entry, in one
    /// transaction.
    async fn insert_project(
        &self,
        project: &Project,
        entry: &HistoryEntry,
    ) -> Result<(), WorkflowError>;

    async fn fetch_project(&self, id: Uuid) -> Result<Option<Project>, WorkflowError>;

    async fn fetch_project_by_number(
        &self,
        number: i64,
    ) -> Result<Option<Project>, WorkflowError>;

    /// Next sequential human-facing project number.
    async fn next_project_number(&self) -> Result<i64, WorkflowError>;

    /// Persist a transition: the updated project row, its history entry, and
    /// optionally a planning-site response, atomically. Fails closed — if
    /// any write fails, nothing is observable.
    async fn apply_transition(
        &self,
        project: &Project,
        entry: &HistoryEntry,
        approval: Option<&LocationApproval>,
    ) -> Result<(), WorkflowError>;

    /// All projects in one archive partition (live or archived).
    async fn list_projects(&self, archived: bool) -> Result<Vec<Project>, WorkflowError>;

    /// Sweep predicate: approved projects whose last delivery date lies
    /// strictly before `today`. Excluding non-approved rows is what makes
    /// the sweep idempotent.
    async fn approved_projects_past_delivery(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<Project>, WorkflowError>;

    async fn location_approvals(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<LocationApproval>, WorkflowError>;

    async fn history_for_project(
        &self,
        project_id: Uuid,
        order: ReplayOrder,
    ) -> Result<Vec<HistoryEntry>, WorkflowError>;

    async fn history_for_actor(&self, actor_id: Uuid) -> Result<Vec<HistoryEntry>, WorkflowError>;

    async fn all_history(&self) -> Result<Vec<HistoryEntry>, WorkflowError>;

    /// Look up a prior correction by its client-supplied operation id.
    async fn find_history_by_operation(
        &self,
        project_id: Uuid,
        operation_id: Uuid,
    ) -> Result<Option<HistoryEntry>, WorkflowError>;
}
