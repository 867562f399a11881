//! Auto-completion sweep: approved projects past their delivery window move
//! to ABGESCHLOSSEN exactly once, under the synthetic system actor.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use freigabe::{
    Actor, HistoryAction, Location, ProjectDraft, ProjectStatus, RecordingNotifier, ReplayOrder,
    ProjectStore, Role, SqliteProjectStore, WorkflowEngine,
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

async fn approved_project_with_window(
    engine: &WorkflowEngine<SqliteProjectStore>,
    last_delivery: Option<NaiveDate>,
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
                first_delivery: last_delivery.map(|d| d - chrono::Duration::days(30)),
                last_delivery,
                distribution: dist(&[("Gransee", 500.0)]),
            },
        )
        .await
        .unwrap();
    let reviewer = Actor::new(Uuid::new_v4(), "S. Wolf", Role::SupplyChain);
    engine.approve(&reviewer, project.id).await.unwrap();
    let planner = Actor::new(
        Uuid::new_v4(),
        "P. Gransee",
        Role::PlanungStandort(Location::Gransee),
    );
    let approved = engine
        .approve_location(&planner, project.id, None)
        .await
        .unwrap();
    (approved, creator)
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[tokio::test]
async fn test_sweep_completes_expired_approved_projects() {
    let engine = engine().await;
    let (project, _) = approved_project_with_window(&engine, Some(day(2026, 7, 31))).await;

    let report = engine.run_completion_sweep(day(2026, 8, 7)).await.unwrap();
    assert_eq!(report.completed, vec![project.number]);
    assert!(report.failed.is_empty());

    let completed = engine
        .store()
        .fetch_project(project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completed.status, ProjectStatus::Abgeschlossen);

    let trail = engine
        .store()
        .history_for_project(project.id, ReplayOrder::OldestFirst)
        .await
        .unwrap();
    let last = trail.last().unwrap();
    assert_eq!(last.action, HistoryAction::Archive);
    assert_eq!(last.actor_id, Uuid::nil());
    assert_eq!(last.actor_name, "System");
}

#[tokio::test]
async fn test_sweep_is_idempotent() {
    let engine = engine().await;
    let (project, _) = approved_project_with_window(&engine, Some(day(2026, 7, 31))).await;

    engine.run_completion_sweep(day(2026, 8, 7)).await.unwrap();
    let after_first = engine
        .store()
        .history_for_project(project.id, ReplayOrder::OldestFirst)
        .await
        .unwrap()
        .len();

    // Second run: the query predicate excludes non-approved rows
    let report = engine.run_completion_sweep(day(2026, 8, 7)).await.unwrap();
    assert!(report.completed.is_empty());

    let after_second = engine
        .store()
        .history_for_project(project.id, ReplayOrder::OldestFirst)
        .await
        .unwrap()
        .len();
    assert_eq!(after_first, after_second);

    let unchanged = engine
        .store()
        .fetch_project(project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, ProjectStatus::Abgeschlossen);
}

#[tokio::test]
async fn test_sweep_skips_open_windows_and_windowless_projects() {
    let engine = engine().await;
    let (open_window, _) = approved_project_with_window(&engine, Some(day(2026, 12, 31))).await;
    let (no_window, _) = approved_project_with_window(&engine, None).await;
    // Last delivery exactly today does not count as expired
    let (today_window, _) = approved_project_with_window(&engine, Some(day(2026, 8, 7))).await;

    let report = engine.run_completion_sweep(day(2026, 8, 7)).await.unwrap();
    assert!(report.completed.is_empty());

    for project in [open_window, no_window, today_window] {
        let unchanged = engine
            .store()
            .fetch_project(project.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unchanged.status, ProjectStatus::Genehmigt);
    }
}

#[tokio::test]
async fn test_sweep_skips_archived_projects() {
    let engine = engine().await;
    let (project, creator) = approved_project_with_window(&engine, Some(day(2026, 7, 31))).await;
    engine.archive(&creator, project.id).await.unwrap();

    let report = engine.run_completion_sweep(day(2026, 8, 7)).await.unwrap();
    assert!(report.completed.is_empty());

    let unchanged = engine
        .store()
        .fetch_project(project.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, ProjectStatus::Genehmigt);
    assert!(unchanged.archived);
}
