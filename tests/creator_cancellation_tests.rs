//! Creator-initiated cancellation of an approved project: authorization is
//! strict identity equality, never the display name.

use std::collections::BTreeMap;
use std::sync::Arc;

use uuid::Uuid;

use freigabe::{
    Actor, HistoryAction, Location, ProjectDraft, ProjectStatus, RecordingNotifier, ReplayOrder,
    ProjectStore, Role, SqliteProjectStore, WorkflowEngine, WorkflowError,
};

async fn engine() -> WorkflowEngine<SqliteProjectStore> {
    let store = SqliteProjectStore::in_memory()
        .await
        .expect("Failed to open in-memory store");
    WorkflowEngine::new(Arc::new(store), Arc::new(RecordingNotifier::new()))
}

fn dist(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
    pairs
        .iter()
        .map(|(name, qty)| (name.to_string(), *qty))
        .collect()
}

/// Drive a fresh project to GENEHMIGT and return it with its creator.
async fn approved_project(
    engine: &WorkflowEngine<SqliteProjectStore>,
) -> (freigabe::Project, Actor) {
    let creator = Actor::new(Uuid::new_v4(), "V. Meyer", Role::Vertrieb);
    let project = engine
        .submit(
            &creator,
            ProjectDraft {
                customer: "Kunde A".to_string(),
                article: "Artikel X".to_string(),
                total_quantity: 500.0,
                quantity_fixed: false,
                first_delivery: None,
                last_delivery: None,
                distribution: dist(&[("Storkow", 500.0)]),
            },
        )
        .await
        .unwrap();
    let reviewer = Actor::new(Uuid::new_v4(), "S. Wolf", Role::SupplyChain);
    engine.approve(&reviewer, project.id).await.unwrap();
    let planner = Actor::new(
        Uuid::new_v4(),
        "P. Storkow",
        Role::PlanungStandort(Location::Storkow),
    );
    let approved = engine
        .approve_location(&planner, project.id, None)
        .await
        .unwrap();
    assert_eq!(approved.status, ProjectStatus::Genehmigt);
    (approved, creator)
}

#[tokio::test]
async fn test_creator_may_cancel_their_approved_project() {
    let engine = engine().await;
    let (project, creator) = approved_project(&engine).await;

    let cancelled = engine
        .reject(&creator, project.id, "customer withdrew the order")
        .await
        .unwrap();

    assert_eq!(cancelled.status, ProjectStatus::Abgelehnt);
    assert_eq!(
        cancelled.rejection_reason.as_deref(),
        Some("customer withdrew the order")
    );

    let trail = engine
        .store()
        .history_for_project(project.id, ReplayOrder::OldestFirst)
        .await
        .unwrap();
    let last = trail.last().unwrap();
    assert_eq!(last.action, HistoryAction::Reject);
    assert_eq!(last.previous_status, Some(ProjectStatus::Genehmigt));
    assert_eq!(last.new_status, Some(ProjectStatus::Abgelehnt));
}

#[tokio::test]
async fn test_other_actors_cannot_cancel_even_with_matching_display_name() {
    let engine = engine().await;
    let (project, creator) = approved_project(&engine).await;

    // Same display name, same role, different identity: must be rejected.
    let impostor = Actor::new(Uuid::new_v4(), creator.display_name.clone(), Role::Vertrieb);
    let before = engine
        .store()
        .history_for_project(project.id, ReplayOrder::OldestFirst)
        .await
        .unwrap()
        .len();

    let err = engine
        .reject(&impostor, project.id, "trying to cancel")
        .await
        .unwrap_err();
    assert!(matches!(err, WorkflowError::Permission(_)));

    let unchanged = engine
        .store()
        .fetch_project(project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, ProjectStatus::Genehmigt);
    assert!(unchanged.rejection_reason.is_none());

    let after = engine
        .store()
        .history_for_project(project.id, ReplayOrder::OldestFirst)
        .await
        .unwrap()
        .len();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_cancellation_requires_reason() {
    let engine = engine().await;
    let (project, creator) = approved_project(&engine).await;

    let err = engine.reject(&creator, project.id, "").await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));

    let unchanged = engine
        .store()
        .fetch_project(project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, ProjectStatus::Genehmigt);
}

#[tokio::test]
async fn test_archive_is_orthogonal_to_status() {
    let engine = engine().await;
    let (project, creator) = approved_project(&engine).await;

    let archived = engine.archive(&creator, project.id).await.unwrap();

    assert!(archived.archived);
    assert!(archived.archived_at.is_some());
    // Status value is never coerced by archiving
    assert_eq!(archived.status, ProjectStatus::Genehmigt);
    assert_eq!(archived.status.code(), 5);

    // Double-archiving is rejected
    let err = engine.archive(&creator, project.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Validation(_)));
}

#[tokio::test]
async fn test_only_creator_archives() {
    let engine = engine().await;
    let (project, _creator) = approved_project(&engine).await;

    let other = Actor::new(Uuid::new_v4(), "V. Andere", Role::Vertrieb);
    let err = engine.archive(&other, project.id).await.unwrap_err();
    assert!(matches!(err, WorkflowError::Permission(_)));
}
