//! Vote ledger: resolves a pseudo-identity's vote request against the vote it
//! already has on file for a target.
//!
//! The ledger is pure. It never touches storage; callers load a [`Votable`],
//! apply the request and commit the returned state atomically.
use board_shared::types::{Identity, Votable, VoteKind};

/// What a vote request did to the identity's standing on the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VoteTransition {
    /// No prior vote; the requested one was registered.
    Cast,
    /// Same vote repeated; the prior vote was withdrawn.
    Retracted,
    /// Opposite vote on file; it was moved to the requested kind.
    Switched { from: VoteKind },
}

/// The next state of a target after one vote request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoteOutcome {
    /// New voters map and counters. `version` is unchanged; the repository
    /// bumps it when the state is committed.
    pub next: Votable,
    pub transition: VoteTransition,
}

/// `VoteLedger` computes cast/toggle/switch transitions while keeping the
/// counters in lockstep with the voters map.
#[derive(Clone, Copy, Debug, Default)]
pub struct VoteLedger;

impl VoteLedger {
    pub fn new() -> Self {
        Self
    }

    /// Applies `kind` from `identity` to `target`.
    ///
    /// # Arguments
    ///
    /// * `target` - Current vote state, with counters consistent with its map
    /// * `identity` - Requesting pseudo-identity
    /// * `kind` - Requested vote
    ///
    /// # Returns
    ///
    /// The next state and the transition taken. Repeating the same request
    /// alternates between voted and not voted.
    pub fn apply_vote(&self, target: &Votable, identity: &Identity, kind: VoteKind) -> VoteOutcome {
        let mut next = target.clone();
        let key = identity.as_str();

        let transition = match next.vote_of(key) {
            None => {
                next.voters.insert(key.to_string(), kind);
                increment(&mut next, kind);
                VoteTransition::Cast
            }
            Some(previous) if previous == kind => {
                next.voters.remove(key);
                decrement(&mut next, kind);
                VoteTransition::Retracted
            }
            Some(previous) => {
                next.voters.insert(key.to_string(), kind);
                decrement(&mut next, previous);
                increment(&mut next, kind);
                VoteTransition::Switched { from: previous }
            }
        };

        VoteOutcome { next, transition }
    }
}

fn counter(votable: &mut Votable, kind: VoteKind) -> &mut u64 {
    match kind {
        VoteKind::Upvote => &mut votable.upvotes,
        VoteKind::Downvote => &mut votable.downvotes,
    }
}

fn increment(votable: &mut Votable, kind: VoteKind) {
    let slot = counter(votable, kind);
    *slot = slot.saturating_add(1);
}

fn decrement(votable: &mut Votable, kind: VoteKind) {
    let slot = counter(votable, kind);
    *slot = slot.saturating_sub(1);
}
