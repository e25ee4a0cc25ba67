//! Error types for the board repository.
//! Defines specific errors that can occur while loading or committing records.
use thiserror::Error;

/// Represents errors that can occur within the board repository.
///
/// `NotFound` and `Conflict` are part of the persistence contract: callers
/// surface the former and retry the whole read-modify-write on the latter.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Concurrent write detected on {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),
}

impl RepositoryError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, RepositoryError::Conflict(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, RepositoryError::NotFound(_))
    }
}
