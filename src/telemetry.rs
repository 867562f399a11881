use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured logging. JSON output with span context gives the
/// correlation data needed to follow a transition across the engine, store
/// and notification dispatch.
pub fn init_telemetry() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Freigabe telemetry initialized with structured logging");
    Ok(())
}

/// Generate a correlation ID for linking related operations
pub fn generate_correlation_id() -> String {
    Uuid::new_v4().to_string()
}

/// Create a span with common workflow attributes
pub fn create_workflow_span(
    operation: &str,
    project_number: Option<i64>,
    actor: Option<&str>,
    correlation_id: Option<&str>,
) -> tracing::Span {
    tracing::info_span!(
        "workflow_transition",
        operation = operation,
        project.number = project_number,
        actor.name = actor,
        correlation.id = correlation_id,
    )
}

/// Shutdown telemetry gracefully
pub fn shutdown_telemetry() {
    tracing::info!("Freigabe telemetry shutdown complete");
}
