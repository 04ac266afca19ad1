use thiserror::Error;

/// Domain errors that can occur in process management operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Process not found: {0}")]
    ProcessNotFound(String),

    #[error("Process already exists: {0}")]
    DuplicateProcess(String),

    #[error("Process is not running: {0}")]
    NotRunning(String),

    #[error("Invalid state transition from {from} to {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Invalid process name: {0}")]
    InvalidName(String),

    #[error("Missing or empty script for process: {0}")]
    MissingScript(String),

    #[error("Script not found: {0}")]
    ScriptNotFound(String),

    #[error("Working directory not found: {0}")]
    WorkingDirNotFound(String),

    #[error("Unknown environment mode: {0}")]
    UnknownEnvMode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to spawn process: {0}")]
    SpawnFailed(String),

    #[error("Failed to send signal to process: {0}")]
    SignalFailed(String),

    #[error("Restart limit exceeded for process: {0}")]
    RestartLimitExceeded(String),

    #[error("Repository operation failed: {0}")]
    RepositoryError(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
