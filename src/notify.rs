// Notification dispatch is fire-and-forget relative to the status mutation:
// a failed dispatch is logged and never reverses a committed transition.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::error::NotificationError;
use crate::project::QuantitySnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// All required locations responded; the project is approved.
    ProjectApproved,
    /// Planning rolled the project back with corrected quantities.
    PlanningCorrection,
    /// A reviewer or the creator rejected the project.
    ProjectRejected,
}

/// Payload handed to the outbound dispatcher. Formatting and template
/// content live with the collaborator, not here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub project_id: Uuid,
    pub project_number: i64,
    pub customer: String,
    pub article: String,
    pub actor_name: String,
    pub creator_id: Uuid,
    pub reason: Option<String>,
    pub before: Option<QuantitySnapshot>,
    pub after: Option<QuantitySnapshot>,
}

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn dispatch(&self, notification: Notification) -> Result<(), NotificationError>;
}

/// Spawn the dispatch and walk away. Failures surface in the log only.
pub fn dispatch_detached(notifier: Arc<dyn Notifier>, notification: Notification) {
    tokio::spawn(async move {
        let kind = notification.kind;
        let project = notification.project_number;
        if let Err(e) = notifier.dispatch(notification).await {
            tracing::warn!(
                project = %project,
                kind = ?kind,
                error = %e,
                "Notification dispatch failed"
            );
        }
    });
}

/// Default dispatcher: writes the notification to the structured log. Real
/// deployments plug an email gateway in behind the same trait.
#[derive(Debug, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn dispatch(&self, notification: Notification) -> Result<(), NotificationError> {
        tracing::info!(
            project = %notification.project_number,
            kind = ?notification.kind,
            customer = %notification.customer,
            actor = %notification.actor_name,
            reason = ?notification.reason,
            "Outbound notification"
        );
        Ok(())
    }
}

/// Test dispatcher that records everything it is handed.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn sent(&self) -> Vec<Notification> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn dispatch(&self, notification: Notification) -> Result<(), NotificationError> {
        self.sent.lock().await.push(notification);
        Ok(())
    }
}

/// Test dispatcher that always fails, for verifying that notification
/// failures never reach the acting user.
#[derive(Debug, Default)]
pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn dispatch(&self, _notification: Notification) -> Result<(), NotificationError> {
        Err(NotificationError::Dispatch("gateway unreachable".to_string()))
    }
}
