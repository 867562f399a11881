// Scheduled auto-completion: approved projects whose delivery window has
// fully passed move to ABGESCHLOSSEN under a synthetic system actor.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::WorkflowError;
use crate::identity::system_actor;
use crate::project::HistoryAction;
use crate::status::ProjectStatus;
use crate::store::ProjectStore;
use crate::workflow::engine::WorkflowEngine;

/// Outcome of one sweep run.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Human-facing numbers of projects completed this run.
    pub completed: Vec<i64>,
    /// Projects the sweep could not complete, with the store error text.
    pub failed: Vec<(i64, String)>,
}

impl<S: ProjectStore> WorkflowEngine<S> {
    /// Complete every approved project whose last delivery date lies before
    /// `today`. The query predicate only matches GENEHMIGT rows, so
    /// re-running against already-completed projects is a no-op. Each
    /// project commits independently; one failure does not stop the batch.
    pub async fn run_completion_sweep(
        &self,
        today: NaiveDate,
    ) -> Result<SweepReport, WorkflowError> {
        let due = self.store().approved_projects_past_delivery(today).await?;
        let system = system_actor();
        let mut report = SweepReport::default();

        for project in due {
            let mut updated = project.clone();
            updated.status = ProjectStatus::Abgeschlossen;
            updated.updated_at = Utc::now();
            let entry = Self::entry(
                &updated,
                &system,
                HistoryAction::Archive,
                Some(project.status),
                Some(ProjectStatus::Abgeschlossen),
                Some("delivery window elapsed".to_string()),
                None,
                None,
            );
            match self.store().apply_transition(&updated, &entry, None).await {
                Ok(()) => {
                    self.feed().publish(&entry);
                    info!(
                        project = %project.number,
                        last_delivery = ?project.last_delivery,
                        "Project auto-completed"
                    );
                    report.completed.push(project.number);
                }
                Err(e) => {
                    warn!(project = %project.number, error = %e, "Auto-completion failed");
                    report.failed.push((project.number, e.to_string()));
                }
            }
        }

        info!(
            completed = report.completed.len(),
            failed = report.failed.len(),
            "Completion sweep finished"
        );
        Ok(report)
    }
}
