use serde::{Deserialize, Serialize};

use crate::error::WorkflowError;
use crate::identity::Actor;
use crate::project::Project;
use crate::roles::Role;
use crate::status::ProjectStatus;

/// Workflow actions, one per table row family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionAction {
    Submit,
    Resubmit,
    Approve,
    ApproveLocation,
    Reject,
    CancelApproved,
    Correct,
    Archive,
    AutoComplete,
}

/// Who may fire a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGate {
    /// Sales staff.
    Vertrieb,
    /// Supply-chain reviewers.
    SupplyChain,
    /// Any member of the planning family (scoped or unscoped) or admin.
    Planning,
    /// Strictly the project's creator, compared by identity reference.
    Creator,
    /// Scheduled jobs only; no interactive caller qualifies.
    System,
}

impl RoleGate {
    /// Check the gate against the calling actor. Creator gates compare the
    /// immutable identity uuid — display names never participate.
    pub fn permits(self, actor: &Actor, project: Option<&Project>) -> Result<(), WorkflowError> {
        match self {
            RoleGate::Vertrieb => match actor.role {
                Role::Vertrieb => Ok(()),
                _ => Err(WorkflowError::permission(format!(
                    "role '{}' may not perform this action",
                    actor.role
                ))),
            },
            RoleGate::SupplyChain => match actor.role {
                Role::SupplyChain => Ok(()),
                _ => Err(WorkflowError::permission(format!(
                    "role '{}' may not perform this action",
                    actor.role
                ))),
            },
            RoleGate::Planning => {
                if actor.role.is_planning() || actor.role.is_admin() {
                    Ok(())
                } else {
                    Err(WorkflowError::permission(format!(
                        "role '{}' may not perform planning actions",
                        actor.role
                    )))
                }
            }
            RoleGate::Creator => {
                let project = project.ok_or(WorkflowError::ProjectNotFound)?;
                if project.creator_id == actor.id {
                    Ok(())
                } else {
                    Err(WorkflowError::permission("not the project creator"))
                }
            }
            RoleGate::System => Err(WorkflowError::permission(
                "reserved for the scheduled sweep",
            )),
        }
    }
}

/// One row of the transition table.
#[derive(Debug, Clone, Copy)]
pub struct TransitionRule {
    /// Current status; `None` is project creation.
    pub from: Option<ProjectStatus>,
    pub action: TransitionAction,
    /// Resulting status; `None` leaves the status value untouched
    /// (archiving) or defers resolution (per-location approval stays in
    /// planning review until every required site has responded).
    pub to: Option<ProjectStatus>,
    pub gate: RoleGate,
    pub requires_reason: bool,
}

/// The canonical transition table. The legacy six-state workflow is not
/// represented; this is the richer per-location model only.
pub const TRANSITION_TABLE: &[TransitionRule] = &[
    TransitionRule {
        from: None,
        action: TransitionAction::Submit,
        to: Some(ProjectStatus::PruefungSupplyChain),
        gate: RoleGate::Vertrieb,
        requires_reason: false,
    },
    TransitionRule {
        from: Some(ProjectStatus::PruefungVertrieb),
        action: TransitionAction::Resubmit,
        to: Some(ProjectStatus::PruefungSupplyChain),
        gate: RoleGate::Creator,
        requires_reason: false,
    },
    TransitionRule {
        from: Some(ProjectStatus::PruefungSupplyChain),
        action: TransitionAction::Approve,
        to: Some(ProjectStatus::PruefungPlanung),
        gate: RoleGate::SupplyChain,
        requires_reason: false,
    },
    TransitionRule {
        from: Some(ProjectStatus::PruefungSupplyChain),
        action: TransitionAction::Reject,
        to: Some(ProjectStatus::Abgelehnt),
        gate: RoleGate::SupplyChain,
        requires_reason: true,
    },
    TransitionRule {
        from: Some(ProjectStatus::PruefungSupplyChain),
        action: TransitionAction::Correct,
        to: Some(ProjectStatus::PruefungVertrieb),
        gate: RoleGate::SupplyChain,
        requires_reason: true,
    },
    TransitionRule {
        from: Some(ProjectStatus::PruefungPlanung),
        action: TransitionAction::ApproveLocation,
        to: None,
        gate: RoleGate::Planning,
        requires_reason: false,
    },
    TransitionRule {
        from: Some(ProjectStatus::PruefungPlanung),
        action: TransitionAction::Correct,
        to: Some(ProjectStatus::PruefungSupplyChain),
        gate: RoleGate::Planning,
        requires_reason: true,
    },
    TransitionRule {
        from: Some(ProjectStatus::Genehmigt),
        action: TransitionAction::CancelApproved,
        to: Some(ProjectStatus::Abgelehnt),
        gate: RoleGate::Creator,
        requires_reason: true,
    },
    TransitionRule {
        from: Some(ProjectStatus::Genehmigt),
        action: TransitionAction::AutoComplete,
        to: Some(ProjectStatus::Abgeschlossen),
        gate: RoleGate::System,
        requires_reason: false,
    },
    TransitionRule {
        from: Some(ProjectStatus::Genehmigt),
        action: TransitionAction::Archive,
        to: None,
        gate: RoleGate::Creator,
        requires_reason: false,
    },
    TransitionRule {
        from: Some(ProjectStatus::Abgelehnt),
        action: TransitionAction::Archive,
        to: None,
        gate: RoleGate::Creator,
        requires_reason: false,
    },
    TransitionRule {
        from: Some(ProjectStatus::Abgeschlossen),
        action: TransitionAction::Archive,
        to: None,
        gate: RoleGate::Creator,
        requires_reason: false,
    },
];

/// Look up the rule for a (status, action) pair. `None` means the tuple is
/// outside the table and the transition must be rejected before any
/// mutation.
pub fn find_rule(
    from: Option<ProjectStatus>,
    action: TransitionAction,
) -> Option<&'static TransitionRule> {
    TRANSITION_TABLE
        .iter()
        .find(|rule| rule.from == from && rule.action == action)
}
