//! Role- and location-based visibility: which projects appear in an actor's
//! workable list, and how the archive partitions.

use serde::{Deserialize, Serialize};

use crate::project::Project;
use crate::roles::Role;
use crate::status::ProjectStatus;

/// Whether `project` belongs to the workable list for `role`.
///
/// Location scoping applies only during planning review: a site-scoped
/// planner sees a project in PRUEFUNG_PLANUNG only if that project's
/// distribution carries a positive quantity under any recognized spelling of
/// their site. Outside planning review the location filter is bypassed.
pub fn can_view(role: &Role, project: &Project) -> bool {
    match role {
        Role::Admin | Role::Vertrieb => true,
        Role::SupplyChain => project.status == ProjectStatus::PruefungSupplyChain,
        Role::Planung => true,
        Role::PlanungStandort(site) => {
            if project.status != ProjectStatus::PruefungPlanung {
                return true;
            }
            project.quantity_for(*site) > 0.0
        }
    }
}

/// Filter a list down to what the actor may see.
pub fn visible_projects(role: &Role, projects: Vec<Project>) -> Vec<Project> {
    projects
        .into_iter()
        .filter(|p| can_view(role, p))
        .collect()
}

/// Archive partition filter: which terminal status preceded archiving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArchiveFilter {
    All,
    ApprovedThenArchived,
    RejectedThenArchived,
}

impl ArchiveFilter {
    pub fn matches(self, project: &Project) -> bool {
        if !project.archived {
            return false;
        }
        match self {
            ArchiveFilter::All => true,
            ArchiveFilter::ApprovedThenArchived => matches!(
                project.status,
                ProjectStatus::Genehmigt | ProjectStatus::Abgeschlossen
            ),
            ArchiveFilter::RejectedThenArchived => project.status == ProjectStatus::Abgelehnt,
        }
    }
}

/// The archive view, filterable by preceding terminal status. The archive
/// is a shared partition; role restrictions do not apply here.
pub fn archived_projects(projects: Vec<Project>, filter: ArchiveFilter) -> Vec<Project> {
    projects
        .into_iter()
        .filter(|p| filter.matches(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roles::Location;
    use chrono::Utc;
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn project(status: ProjectStatus, distribution: &[(&str, f64)]) -> Project {
        Project {
            id: Uuid::new_v4(),
            number: 1,
            customer: "Kunde".to_string(),
            article: "Artikel".to_string(),
            total_quantity: 100.0,
            quantity_fixed: false,
            first_delivery: None,
            last_delivery: None,
            distribution: distribution
                .iter()
                .map(|(name, qty)| (name.to_string(), *qty))
                .collect::<BTreeMap<_, _>>(),
            status,
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
    fn test_planning_visibility_by_location_share() {
        let p = project(
            ProjectStatus::PruefungPlanung,
            &[("Storkow", 50.0), ("Brenz", 0.0)],
        );

        assert!(can_view(&Role::PlanungStandort(Location::Storkow), &p));
        assert!(!can_view(&Role::PlanungStandort(Location::Brenz), &p));
        assert!(can_view(&Role::Planung, &p));
        assert!(can_view(&Role::Admin, &p));
        assert!(can_view(&Role::Vertrieb, &p));
    }

    #[test]
    fn test_location_filter_bypassed_outside_planning_review() {
        let p = project(ProjectStatus::Genehmigt, &[("Storkow", 50.0)]);
        assert!(can_view(&Role::PlanungStandort(Location::Brenz), &p));
    }

    #[test]
    fn test_location_match_uses_aliases() {
        let p = project(ProjectStatus::PruefungPlanung, &[("Storkow (Mark)", 25.0)]);
        assert!(can_view(&Role::PlanungStandort(Location::Storkow), &p));
    }

    #[test]
    fn test_supply_chain_sees_only_its_stage() {
        let in_review = project(ProjectStatus::PruefungSupplyChain, &[("Brenz", 10.0)]);
        let in_planning = project(ProjectStatus::PruefungPlanung, &[("Brenz", 10.0)]);

        assert!(can_view(&Role::SupplyChain, &in_review));
        assert!(!can_view(&Role::SupplyChain, &in_planning));
    }

    #[test]
    fn test_archive_partition_by_preceding_status() {
        let mut approved = project(ProjectStatus::Genehmigt, &[]);
        approved.archived = true;
        let mut rejected = project(ProjectStatus::Abgelehnt, &[]);
        rejected.archived = true;
        let mut completed = project(ProjectStatus::Abgeschlossen, &[]);
        completed.archived = true;
        let live = project(ProjectStatus::Genehmigt, &[]);

        let all = vec![approved.clone(), rejected.clone(), completed.clone(), live];
        assert_eq!(
            archived_projects(all.clone(), ArchiveFilter::All).len(),
            3
        );
        assert_eq!(
            archived_projects(all.clone(), ArchiveFilter::ApprovedThenArchived).len(),
            2
        );
        assert_eq!(
            archived_projects(all, ArchiveFilter::RejectedThenArchived).len(),
            1
        );
    }
}
