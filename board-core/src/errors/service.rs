//! Error types for the board service.
//! Consolidates errors from the repositories, the ownership guard and input validation.
use board_repository::RepositoryError;
use board_shared::types::{CategoryError, IdentityError};
use thiserror::Error;

use crate::errors::OwnershipError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Unauthorized: invalid edit token")]
    Forbidden,

    #[error("Concurrent update on {0}, please retry")]
    Conflict(String),

    #[error("{0}")]
    Validation(String),

    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for ServiceError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => ServiceError::NotFound(what),
            RepositoryError::Conflict(what) => ServiceError::Conflict(what),
            other => ServiceError::Repository(other),
        }
    }
}

impl From<OwnershipError> for ServiceError {
    fn from(_: OwnershipError) -> Self {
        ServiceError::Forbidden
    }
}

impl From<IdentityError> for ServiceError {
    fn from(err: IdentityError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}

impl From<CategoryError> for ServiceError {
    fn from(err: CategoryError) -> Self {
        ServiceError::Validation(err.to_string())
    }
}
