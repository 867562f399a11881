use thiserror::Error;

/// Errors surfaced by workflow transitions and store reads.
///
/// Validation and permission failures are rejected before any mutation;
/// transient store failures are never retried here — callers re-query
/// current status and retry explicitly.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("permission denied: {0}")]
    Permission(String),

    #[error("project not found")]
    ProjectNotFound,

    #[error("unknown location: {0}")]
    LocationNotFound(String),

    #[error("store error: {0}")]
    Transient(#[from] sqlx::Error),

    #[error("corrupt stored record: {0}")]
    Corrupt(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkflowError {
    pub fn validation(msg: impl Into<String>) -> Self {
        WorkflowError::Validation(msg.into())
    }

    pub fn permission(msg: impl Into<String>) -> Self {
        WorkflowError::Permission(msg.into())
    }

    /// Whether the caller may usefully retry after re-querying status.
    pub fn is_transient(&self) -> bool {
        matches!(self, WorkflowError::Transient(_))
    }
}

/// Notification failures are a side channel: logged, never propagated into
/// the transactional contract.
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),
}
