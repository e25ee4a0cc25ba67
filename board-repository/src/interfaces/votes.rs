//! This module defines the `VoteRepository` trait, the persistence seam used
//! by the vote ledger's read-modify-write cycle.
use async_trait::async_trait;
use board_shared::types::{TargetRef, Votable};

use crate::errors::RepositoryError;

/// A trait that defines how votable targets are read and committed.
///
/// Implementors must commit the voters map and both counters as one atomic
/// unit, guarded by `Votable::version`.
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Loads the vote state of a post or comment.
    ///
    /// # Returns
    ///
    /// * `Ok(Votable)` - Current voters map, counters and version
    /// * `Err(RepositoryError::NotFound)` - No such target
    async fn load_target(&self, target: TargetRef) -> Result<Votable, RepositoryError>;

    /// Commits a new vote state computed from a previously loaded one.
    ///
    /// The write succeeds only if the stored version still equals
    /// `votable.version`; the stored version is then incremented.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Voters and counters committed together
    /// * `Err(RepositoryError::Conflict)` - Another writer committed first
    /// * `Err(RepositoryError::NotFound)` - The target disappeared
    async fn commit_target(&self, votable: &Votable) -> Result<(), RepositoryError>;
}
