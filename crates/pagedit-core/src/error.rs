//! Error types for pagedit-core

use thiserror::Error;

/// Result type alias using pagedit-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in pagedit-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// The edit was built against an outdated object version
    #[error("Version conflict: edit carries version {submitted}, page is at {current}")]
    VersionConflict { submitted: i64, current: i64 },

    /// Page, workspace, or attachment not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The session was already saved or cancelled
    #[error("Edit session is closed")]
    SessionClosed,

    /// A save is still waiting on the page store
    #[error("A save is already in progress")]
    SaveInProgress,

    /// Page store failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
