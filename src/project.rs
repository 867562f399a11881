use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::roles::Location;
use crate::status::ProjectStatus;

/// A production request moving through the approval workflow.
///
/// Never physically deleted; terminal projects are archived via the flag.
/// `creator_name` is display-only — authorization always compares
/// `creator_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    /// Sequential human-facing number.
    pub number: i64,
    pub customer: String,
    pub article: String,
    pub total_quantity: f64,
    pub quantity_fixed: bool,
    pub first_delivery: Option<NaiveDate>,
    pub last_delivery: Option<NaiveDate>,
    /// Per-location quantity shares, keyed by the site name as entered.
    pub distribution: BTreeMap<String, f64>,
    pub status: ProjectStatus,
    pub creator_id: Uuid,
    pub creator_name: String,
    pub archived: bool,
    pub archived_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Sites that must respond during planning review: every location whose
    /// distributed share is positive.
    pub fn required_locations(&self) -> Vec<Location> {
        let mut required: Vec<Location> = Vec::new();
        for (name, quantity) in &self.distribution {
            if *quantity > 0.0 {
                if let Some(loc) = Location::resolve(name) {
                    if !required.contains(&loc) {
                        required.push(loc);
                    }
                }
            }
        }
        required
    }

    /// Positive share for a given site under any of its recognized
    /// spellings.
    pub fn quantity_for(&self, location: Location) -> f64 {
        self.distribution
            .iter()
            .filter(|(name, _)| location.matches(name))
            .map(|(_, qty)| *qty)
            .sum()
    }

    /// The delivery window has fully passed (drives auto-completion).
    pub fn delivery_window_expired(&self, today: NaiveDate) -> bool {
        match self.last_delivery {
            Some(last) => today > last,
            None => false,
        }
    }
}

/// Input for creating a new project. The delivery window is validated here;
/// the distribution is validated by the reconciler at submission time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub customer: String,
    pub article: String,
    pub total_quantity: f64,
    pub quantity_fixed: bool,
    pub first_delivery: Option<NaiveDate>,
    pub last_delivery: Option<NaiveDate>,
    pub distribution: BTreeMap<String, f64>,
}

impl ProjectDraft {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.customer.trim().is_empty() {
            return Err(WorkflowError::validation("customer is required"));
        }
        if self.article.trim().is_empty() {
            return Err(WorkflowError::validation("article is required"));
        }
        if let (Some(first), Some(last)) = (self.first_delivery, self.last_delivery) {
            if first > last {
                return Err(WorkflowError::validation(
                    "first delivery date must not be after last delivery date",
                ));
            }
        }
        Ok(())
    }
}

/// Requested change to quantity and/or distribution during a correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuantityCorrection {
    pub total_quantity: Option<f64>,
    pub distribution: Option<BTreeMap<String, f64>>,
    pub reason: String,
    /// Client-supplied idempotency key; replaying the same id is a no-op.
    pub operation_id: Option<Uuid>,
}

/// Quantity state captured before/after a correction, stored as structured
/// JSON on the history entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantitySnapshot {
    pub total_quantity: f64,
    pub distribution: BTreeMap<String, f64>,
}

impl QuantitySnapshot {
    pub fn of(project: &Project) -> Self {
        Self {
            total_quantity: project.total_quantity,
            distribution: project.distribution.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrectionDiff {
    pub before: QuantitySnapshot,
    pub after: QuantitySnapshot,
}

/// Closed vocabulary of audit actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryAction {
    Create,
    Approve,
    ApprovedForwarded,
    LocationApproved,
    Reject,
    Rejected,
    Correct,
    Correction,
    Corrected,
    Archive,
    SendToProgress,
}

impl HistoryAction {
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryAction::Create => "create",
            HistoryAction::Approve => "approve",
            HistoryAction::ApprovedForwarded => "approved_forwarded",
            HistoryAction::LocationApproved => "location_approved",
            HistoryAction::Reject => "reject",
            HistoryAction::Rejected => "rejected",
            HistoryAction::Correct => "correct",
            HistoryAction::Correction => "correction",
            HistoryAction::Corrected => "corrected",
            HistoryAction::Archive => "archive",
            HistoryAction::SendToProgress => "send_to_progress",
        }
    }

    pub fn from_str(s: &str) -> Option<HistoryAction> {
        match s {
            "create" => Some(HistoryAction::Create),
            "approve" => Some(HistoryAction::Approve),
            "approved_forwarded" => Some(HistoryAction::ApprovedForwarded),
            "location_approved" => Some(HistoryAction::LocationApproved),
            "reject" => Some(HistoryAction::Reject),
            "rejected" => Some(HistoryAction::Rejected),
            "correct" => Some(HistoryAction::Correct),
            "correction" => Some(HistoryAction::Correction),
            "corrected" => Some(HistoryAction::Corrected),
            "archive" => Some(HistoryAction::Archive),
            "send_to_progress" => Some(HistoryAction::SendToProgress),
            _ => None,
        }
    }
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One immutable line of a project's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub project_id: Uuid,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub action: HistoryAction,
    pub previous_status: Option<ProjectStatus>,
    pub new_status: Option<ProjectStatus>,
    pub reason: Option<String>,
    pub diff: Option<CorrectionDiff>,
    pub operation_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// A planning site's recorded response during per-location review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationApproval {
    pub project_id: Uuid,
    pub location: Location,
    pub actor_id: Uuid,
    pub actor_name: String,
    pub approved_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_project() -> Project {
        Project {
            id: Uuid::new_v4(),
            number: 1,
            customer: "Kunde A".to_string(),
            article: "Artikel X".to_string(),
            total_quantity: 1000.0,
            quantity_fixed: false,
            first_delivery: None,
            last_delivery: None,
            distribution: BTreeMap::new(),
            status: ProjectStatus::PruefungSupplyChain,
            creator_id: Uuid::new_v4(),
            creator_name: "V. Meyer".to_string(),
            archived: false,
            archived_at: None,
            rejection_reason: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_required_locations_ignore_zero_shares() {
        let mut project = sample_project();
        project.distribution.insert("Storkow".to_string(), 50.0);
        project.distribution.insert("Brenz".to_string(), 0.0);

        assert_eq!(project.required_locations(), vec![Location::Storkow]);
    }

    #[test]
    fn test_quantity_for_matches_aliases() {
        let mut project = sample_project();
        project
            .distribution
            .insert("Storkow (Mark)".to_string(), 300.0);

        assert_eq!(project.quantity_for(Location::Storkow), 300.0);
        assert_eq!(project.quantity_for(Location::Brenz), 0.0);
    }

    #[test]
    fn test_delivery_window_expiry() {
        let mut project = sample_project();
        let today = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();

        assert!(!project.delivery_window_expired(today));

        project.last_delivery = NaiveDate::from_ymd_opt(2026, 8, 6);
        assert!(project.delivery_window_expired(today));

        project.last_delivery = NaiveDate::from_ymd_opt(2026, 8, 7);
        assert!(!project.delivery_window_expired(today));
    }

    #[test]
    fn test_draft_rejects_inverted_delivery_window() {
        let draft = ProjectDraft {
            customer: "Kunde".to_string(),
            article: "Artikel".to_string(),
            total_quantity: 100.0,
            quantity_fixed: false,
            first_delivery: NaiveDate::from_ymd_opt(2026, 9, 1),
            last_delivery: NaiveDate::from_ymd_opt(2026, 8, 1),
            distribution: BTreeMap::new(),
        };
        assert!(draft.validate().is_err());
    }

    #[test]
    fn test_action_tags_round_trip() {
        for action in [
            HistoryAction::Create,
            HistoryAction::Approve,
            HistoryAction::ApprovedForwarded,
            HistoryAction::LocationApproved,
            HistoryAction::Reject,
            HistoryAction::Correction,
            HistoryAction::Archive,
            HistoryAction::SendToProgress,
        ] {
            assert_eq!(HistoryAction::from_str(action.as_str()), Some(action));
        }
        assert_eq!(HistoryAction::from_str("merge"), None);
    }
}
