use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::WorkflowError;
use crate::history::HistoryFeed;
use crate::identity::Actor;
use crate::notify::{dispatch_detached, Notification, NotificationKind, Notifier};
use crate::project::{
    CorrectionDiff, HistoryAction, HistoryEntry, LocationApproval, Project, ProjectDraft,
    QuantityCorrection, QuantitySnapshot,
};
use crate::reconcile::{validate_distribution, SubmissionPolicy};
use crate::roles::Location;
use crate::status::ProjectStatus;
use crate::store::ProjectStore;
use crate::workflow::transitions::{find_rule, TransitionAction, TransitionRule};

/// The state machine driving a project from submission through multi-stage
/// review to its terminal states.
///
/// Every transition runs as: load, rule lookup, gate check, validation,
/// one atomic store commit of the mutated row plus its history entry. A
/// tuple outside the transition table rejects before any mutation and
/// writes no history.
pub struct WorkflowEngine<S> {
    store: Arc<S>,
    notifier: Arc<dyn Notifier>,
    feed: HistoryFeed,
}

impl<S: ProjectStore> WorkflowEngine<S> {
    pub fn new(store: Arc<S>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            feed: HistoryFeed::default(),
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Feed of freshly committed history entries for live viewers.
    pub fn feed(&self) -> &HistoryFeed {
        &self.feed
    }

    fn rule_for(
        status: Option<ProjectStatus>,
        action: TransitionAction,
    ) -> Result<&'static TransitionRule, WorkflowError> {
        find_rule(status, action).ok_or_else(|| match status {
            Some(s) => WorkflowError::permission(format!(
                "no {action:?} transition from status '{}'",
                s.label()
            )),
            None => WorkflowError::permission(format!("{action:?} requires an existing project")),
        })
    }

    async fn load(&self, project_id: Uuid) -> Result<Project, WorkflowError> {
        self.store
            .fetch_project(project_id)
            .await?
            .ok_or(WorkflowError::ProjectNotFound)
    }

    fn ensure_live(project: &Project) -> Result<(), WorkflowError> {
        if project.archived {
            return Err(WorkflowError::validation("project is archived"));
        }
        Ok(())
    }

    fn require_reason(rule: &TransitionRule, reason: &str) -> Result<(), WorkflowError> {
        if rule.requires_reason && reason.trim().is_empty() {
            return Err(WorkflowError::validation("reason required"));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn entry(
        project: &Project,
        actor: &Actor,
        action: HistoryAction,
        previous_status: Option<ProjectStatus>,
        new_status: Option<ProjectStatus>,
        reason: Option<String>,
        diff: Option<CorrectionDiff>,
        operation_id: Option<Uuid>,
    ) -> HistoryEntry {
        HistoryEntry {
            id: Uuid::new_v4(),
            project_id: project.id,
            actor_id: actor.id,
            actor_name: actor.display_name.clone(),
            action,
            previous_status,
            new_status,
            reason,
            diff,
            operation_id,
            created_at: Utc::now(),
        }
    }

    fn notification(
        project: &Project,
        actor: &Actor,
        kind: NotificationKind,
        reason: Option<String>,
        diff: Option<&CorrectionDiff>,
    ) -> Notification {
        Notification {
            kind,
            project_id: project.id,
            project_number: project.number,
            customer: project.customer.clone(),
            article: project.article.clone(),
            actor_name: actor.display_name.clone(),
            creator_id: project.creator_id,
            reason,
            before: diff.map(|d| d.before.clone()),
            after: diff.map(|d| d.after.clone()),
        }
    }

    /// Submit a new production request. Submission auto-advances straight
    /// into supply-chain review; over-distribution hard-blocks here.
    pub async fn submit(
        &self,
        actor: &Actor,
        draft: ProjectDraft,
    ) -> Result<Project, WorkflowError> {
        let rule = Self::rule_for(None, TransitionAction::Submit)?;
        rule.gate.permits(actor, None)?;
        draft.validate()?;
        let reconciliation = validate_distribution(
            draft.total_quantity,
            &draft.distribution,
            SubmissionPolicy::Strict,
        )?;
        for warning in &reconciliation.warnings {
            warn!(location = %warning.location, message = %warning.message, "Distribution warning");
        }

        let now = Utc::now();
        let number = self.store.next_project_number().await?;
        let project = Project {
            id: Uuid::new_v4(),
            number,
            customer: draft.customer,
            article: draft.article,
            total_quantity: draft.total_quantity,
            quantity_fixed: draft.quantity_fixed,
            first_delivery: draft.first_delivery,
            last_delivery: draft.last_delivery,
            distribution: draft.distribution,
            status: rule.to.unwrap_or(ProjectStatus::PruefungSupplyChain),
            creator_id: actor.id,
            creator_name: actor.display_name.clone(),
            archived: false,
            archived_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        let entry = Self::entry(
            &project,
            actor,
            HistoryAction::Create,
            None,
            Some(project.status),
            None,
            None,
            None,
        );

        self.store.insert_project(&project, &entry).await?;
        self.feed.publish(&entry);
        info!(
            project = %project.number,
            customer = %project.customer,
            actor = %actor.display_name,
            "Project submitted"
        );
        Ok(project)
    }

    /// Return a corrected project from sales review back into supply-chain
    /// review. Sales resubmission is the creation flow again: strict
    /// distribution policy.
    pub async fn resubmit(
        &self,
        actor: &Actor,
        project_id: Uuid,
        correction: Option<QuantityCorrection>,
    ) -> Result<Project, WorkflowError> {
        let project = self.load(project_id).await?;
        Self::ensure_live(&project)?;
        let rule = Self::rule_for(Some(project.status), TransitionAction::Resubmit)?;
        rule.gate.permits(actor, Some(&project))?;

        let mut updated = project.clone();
        let mut diff = None;
        let mut reason = None;
        let mut operation_id = None;

        if let Some(correction) = correction {
            if let Some(op) = correction.operation_id {
                if let Some(prior) = self.store.find_history_by_operation(project.id, op).await? {
                    info!(
                        project = %project.number,
                        operation = %op,
                        prior_entry = %prior.id,
                        "Resubmission replay ignored"
                    );
                    return Ok(project);
                }
            }
            operation_id = correction.operation_id;
            let trimmed = correction.reason.trim();
            if !trimmed.is_empty() {
                reason = Some(trimmed.to_string());
            }
            let before = QuantitySnapshot::of(&project);
            if let Some(total) = correction.total_quantity {
                updated.total_quantity = total;
            }
            if let Some(distribution) = correction.distribution {
                updated.distribution = distribution;
            }
            diff = Some(CorrectionDiff {
                before,
                after: QuantitySnapshot {
                    total_quantity: updated.total_quantity,
                    distribution: updated.distribution.clone(),
                },
            });
        }

        validate_distribution(
            updated.total_quantity,
            &updated.distribution,
            SubmissionPolicy::Strict,
        )?;

        let to = rule.to.unwrap_or(project.status);
        updated.status = to;
        updated.updated_at = Utc::now();
        let entry = Self::entry(
            &updated,
            actor,
            HistoryAction::SendToProgress,
            Some(project.status),
            Some(to),
            reason,
            diff,
            operation_id,
        );

        self.store.apply_transition(&updated, &entry, None).await?;
        self.feed.publish(&entry);
        info!(
            project = %project.number,
            from = %project.status,
            to = %to,
            actor = %actor.display_name,
            "Project resubmitted to supply chain"
        );
        Ok(updated)
    }

    /// Supply-chain approval: forward into planning review.
    pub async fn approve(
        &self,
        actor: &Actor,
        project_id: Uuid,
    ) -> Result<Project, WorkflowError> {
        let project = self.load(project_id).await?;
        Self::ensure_live(&project)?;
        let rule = Self::rule_for(Some(project.status), TransitionAction::Approve)?;
        rule.gate.permits(actor, Some(&project))?;

        let to = rule.to.unwrap_or(project.status);
        let mut updated = project.clone();
        updated.status = to;
        updated.updated_at = Utc::now();
        let entry = Self::entry(
            &updated,
            actor,
            HistoryAction::ApprovedForwarded,
            Some(project.status),
            Some(to),
            None,
            None,
            None,
        );

        self.store.apply_transition(&updated, &entry, None).await?;
        self.feed.publish(&entry);
        info!(
            project = %project.number,
            from = %project.status,
            to = %to,
            actor = %actor.display_name,
            "Project forwarded to planning"
        );
        Ok(updated)
    }

    /// Record one planning site's approval. The project reaches GENEHMIGT
    /// once every location holding a positive share has responded.
    pub async fn approve_location(
        &self,
        actor: &Actor,
        project_id: Uuid,
        location: Option<Location>,
    ) -> Result<Project, WorkflowError> {
        let project = self.load(project_id).await?;
        Self::ensure_live(&project)?;
        let rule = Self::rule_for(Some(project.status), TransitionAction::ApproveLocation)?;
        rule.gate.permits(actor, Some(&project))?;

        let site = match (actor.role.planning_site(), location) {
            (Some(own), None) => own,
            (Some(own), Some(requested)) if requested == own => own,
            (Some(own), Some(requested)) => {
                return Err(WorkflowError::permission(format!(
                    "planner for {own} may not respond for {requested}"
                )))
            }
            (None, Some(requested)) => requested,
            (None, None) => {
                return Err(WorkflowError::validation(
                    "location required for unscoped planning approval",
                ))
            }
        };

        let required: BTreeSet<Location> = project.required_locations().into_iter().collect();
        if !required.contains(&site) {
            return Err(WorkflowError::validation(format!(
                "site {site} holds no share in this project"
            )));
        }

        let mut responded: BTreeSet<Location> = self
            .store
            .location_approvals(project.id)
            .await?
            .into_iter()
            .map(|a| a.location)
            .collect();
        let newly_responded = responded.insert(site);
        let fully_resolved = required.iter().all(|loc| responded.contains(loc));

        if !newly_responded && !fully_resolved {
            return Err(WorkflowError::validation(format!(
                "site {site} has already responded"
            )));
        }

        let now = Utc::now();
        if newly_responded {
            let approval = LocationApproval {
                project_id: project.id,
                location: site,
                actor_id: actor.id,
                actor_name: actor.display_name.clone(),
                approved_at: now,
            };
            let entry = Self::entry(
                &project,
                actor,
                HistoryAction::LocationApproved,
                Some(project.status),
                Some(project.status),
                None,
                None,
                None,
            );
            self.store
                .apply_transition(&project, &entry, Some(&approval))
                .await?;
            self.feed.publish(&entry);
            info!(
                project = %project.number,
                site = %site,
                actor = %actor.display_name,
                outstanding = required.iter().filter(|l| !responded.contains(l)).count(),
                "Planning site approved"
            );
        }

        if !fully_resolved {
            return Ok(project);
        }

        let to = ProjectStatus::Genehmigt;
        let mut updated = project.clone();
        updated.status = to;
        updated.updated_at = now;
        let entry = Self::entry(
            &updated,
            actor,
            HistoryAction::Approve,
            Some(project.status),
            Some(to),
            None,
            None,
            None,
        );
        self.store.apply_transition(&updated, &entry, None).await?;
        self.feed.publish(&entry);
        info!(
            project = %project.number,
            from = %project.status,
            to = %to,
            "All planning sites responded, project approved"
        );
        dispatch_detached(
            self.notifier.clone(),
            Self::notification(&updated, actor, NotificationKind::ProjectApproved, None, None),
        );
        Ok(updated)
    }

    /// Reject a project. In supply-chain review this is the reviewer's
    /// rejection; for an approved project it is the creator's self-service
    /// cancellation, gated on strict identity equality.
    pub async fn reject(
        &self,
        actor: &Actor,
        project_id: Uuid,
        reason: &str,
    ) -> Result<Project, WorkflowError> {
        let project = self.load(project_id).await?;
        Self::ensure_live(&project)?;
        let action = if project.status == ProjectStatus::Genehmigt {
            TransitionAction::CancelApproved
        } else {
            TransitionAction::Reject
        };
        let rule = Self::rule_for(Some(project.status), action)?;
        rule.gate.permits(actor, Some(&project))?;
        Self::require_reason(rule, reason)?;

        let to = rule.to.unwrap_or(project.status);
        let mut updated = project.clone();
        updated.status = to;
        updated.rejection_reason = Some(reason.trim().to_string());
        updated.updated_at = Utc::now();
        let entry = Self::entry(
            &updated,
            actor,
            HistoryAction::Reject,
            Some(project.status),
            Some(to),
            Some(reason.trim().to_string()),
            None,
            None,
        );

        self.store.apply_transition(&updated, &entry, None).await?;
        self.feed.publish(&entry);
        info!(
            project = %project.number,
            from = %project.status,
            to = %to,
            actor = %actor.display_name,
            "Project rejected"
        );
        dispatch_detached(
            self.notifier.clone(),
            Self::notification(
                &updated,
                actor,
                NotificationKind::ProjectRejected,
                Some(reason.trim().to_string()),
                None,
            ),
        );
        Ok(updated)
    }

    /// Correction: mutate quantity/distribution and roll the project back
    /// one review stage. Over-distribution only warns here. Corrections are
    /// idempotent-safe via the client-supplied operation id.
    pub async fn correct(
        &self,
        actor: &Actor,
        project_id: Uuid,
        correction: QuantityCorrection,
    ) -> Result<Project, WorkflowError> {
        let project = self.load(project_id).await?;
        Self::ensure_live(&project)?;
        let rule = Self::rule_for(Some(project.status), TransitionAction::Correct)?;
        rule.gate.permits(actor, Some(&project))?;
        Self::require_reason(rule, &correction.reason)?;

        if let Some(op) = correction.operation_id {
            if let Some(prior) = self.store.find_history_by_operation(project.id, op).await? {
                info!(
                    project = %project.number,
                    operation = %op,
                    prior_entry = %prior.id,
                    "Correction replay ignored"
                );
                return Ok(project);
            }
        }

        let before = QuantitySnapshot::of(&project);
        let mut updated = project.clone();
        if let Some(total) = correction.total_quantity {
            updated.total_quantity = total;
        }
        if let Some(distribution) = correction.distribution {
            updated.distribution = distribution;
        }
        let reconciliation = validate_distribution(
            updated.total_quantity,
            &updated.distribution,
            SubmissionPolicy::Advisory,
        )?;
        for warning in &reconciliation.warnings {
            warn!(
                project = %project.number,
                location = %warning.location,
                message = %warning.message,
                "Distribution warning"
            );
        }

        let to = rule.to.unwrap_or(project.status);
        updated.status = to;
        updated.updated_at = Utc::now();
        let diff = CorrectionDiff {
            before,
            after: QuantitySnapshot {
                total_quantity: updated.total_quantity,
                distribution: updated.distribution.clone(),
            },
        };
        let entry = Self::entry(
            &updated,
            actor,
            HistoryAction::Correction,
            Some(project.status),
            Some(to),
            Some(correction.reason.trim().to_string()),
            Some(diff.clone()),
            correction.operation_id,
        );

        self.store.apply_transition(&updated, &entry, None).await?;
        self.feed.publish(&entry);
        info!(
            project = %project.number,
            from = %project.status,
            to = %to,
            actor = %actor.display_name,
            over_distributed = reconciliation.is_over_distributed,
            "Correction applied"
        );
        if project.status == ProjectStatus::PruefungPlanung {
            dispatch_detached(
                self.notifier.clone(),
                Self::notification(
                    &updated,
                    actor,
                    NotificationKind::PlanningCorrection,
                    Some(correction.reason.trim().to_string()),
                    Some(&diff),
                ),
            );
        }
        Ok(updated)
    }

    /// Archive a terminal project. The status value is never touched; only
    /// the flag and timestamp are set.
    pub async fn archive(
        &self,
        actor: &Actor,
        project_id: Uuid,
    ) -> Result<Project, WorkflowError> {
        let project = self.load(project_id).await?;
        if !project.status.is_archivable() {
            return Err(WorkflowError::validation(format!(
                "status '{}' does not permit archiving",
                project.status.label()
            )));
        }
        if project.archived {
            return Err(WorkflowError::validation("project is already archived"));
        }
        let rule = Self::rule_for(Some(project.status), TransitionAction::Archive)?;
        rule.gate.permits(actor, Some(&project))?;

        let now = Utc::now();
        let mut updated = project.clone();
        updated.archived = true;
        updated.archived_at = Some(now);
        updated.updated_at = now;
        let entry = Self::entry(
            &updated,
            actor,
            HistoryAction::Archive,
            Some(project.status),
            Some(project.status),
            None,
            None,
            None,
        );

        self.store.apply_transition(&updated, &entry, None).await?;
        self.feed.publish(&entry);
        info!(
            project = %project.number,
            status = %project.status,
            actor = %actor.display_name,
            "Project archived"
        );
        Ok(updated)
    }
}
