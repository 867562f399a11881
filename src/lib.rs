// Freigabe Library - Manufacturing Project Approval Workflow
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod identity;
pub mod notify;
pub mod project;
pub mod reconcile;
pub mod roles;
pub mod status;
pub mod store;
pub mod telemetry;
pub mod visibility;
pub mod workflow;

// Re-export key types for easy access
pub use config::{config, init_config, FreigabeConfig};
pub use error::{NotificationError, WorkflowError};
pub use history::{actor_trail, project_trail, HistoryFeed};
pub use identity::{system_actor, Actor, IdentityProvider, StaticIdentityProvider};
pub use notify::{LogNotifier, Notification, NotificationKind, Notifier, RecordingNotifier};
pub use project::{
    CorrectionDiff, HistoryAction, HistoryEntry, LocationApproval, Project, ProjectDraft,
    QuantityCorrection, QuantitySnapshot,
};
pub use reconcile::{reconcile, validate_distribution, Reconciliation, SubmissionPolicy};
pub use roles::{Location, Role};
pub use status::{status_info, ProjectStatus, StatusInfo};
pub use store::{ProjectStore, ReplayOrder, SqliteProjectStore};
pub use telemetry::{generate_correlation_id, init_telemetry, shutdown_telemetry};
pub use visibility::{archived_projects, can_view, visible_projects, ArchiveFilter};
pub use workflow::{SweepReport, TransitionAction, WorkflowEngine, TRANSITION_TABLE};
