//! # Board Core
//! This crate holds the state-consistency logic of the board: the vote ledger
//! that resolves cast/toggle/switch transitions, the ownership guard that
//! issues and checks edit tokens, and the service that drives both against
//! the repositories.
pub mod errors;
pub mod ledger;
pub mod ownership;
pub mod service;

pub use errors::{OwnershipError, ServiceError};
pub use ledger::{VoteLedger, VoteOutcome, VoteTransition};
pub use ownership::OwnershipGuard;
pub use service::{BoardService, PostDraft, ServiceSettings};
