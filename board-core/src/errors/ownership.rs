//! Error types for the ownership guard.
use thiserror::Error;

/// The only way an edit credential check can fail.
///
/// Carries no detail about whether the token was missing,
/// empty or wrong.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum OwnershipError {
    #[error("Unauthorized: invalid edit token")]
    Unauthorized,
}
