use thiserror::Error;

use crate::state_machine::Stage;

#[derive(Debug, Error)]
pub enum EntregaError {
    #[error("Seed file contains no jobs: {0}")]
    EmptySeed(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Recoverable outcomes of lifecycle operations. None of these are fatal;
/// every failure leaves the lifecycle state exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Another delivery is already in progress")]
    AlreadyActive,

    #[error("No delivery in progress")]
    NoActiveJob,

    #[error("Invalid transition from stage {0}")]
    InvalidTransition(Stage),

    #[error("Job id already known: {0}")]
    DuplicateJob(String),
}
