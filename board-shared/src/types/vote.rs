use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::TargetRef;

/// Represents the type of vote cast by a pseudo-identity.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VoteKind {
    /// Indicates an upvote or positive endorsement.
    Upvote,
    /// Indicates a downvote or negative endorsement.
    Downvote,
}

/// Pseudo-identity -> vote currently on file. Absence means "has not voted".
pub type Voters = BTreeMap<String, VoteKind>;

/// The public, aggregated view of the votes on a target.
///
/// This is the only vote data ever returned to clients; the identity-to-vote
/// linkage stays inside [`Votable`].
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteCounts {
    pub upvotes: u64,
    pub downvotes: u64,
}

/// The vote-bearing state of a post or comment.
///
/// `voters` is the source of truth; `upvotes`/`downvotes` are a cache of its
/// tallies that must be persisted in the same write as the map. `version`
/// is bumped by the repository on every successful commit and is used to
/// detect concurrent writers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Votable {
    pub target: TargetRef,
    pub upvotes: u64,
    pub downvotes: u64,
    pub voters: Voters,
    pub version: u64,
}

impl Votable {
    /// A target nobody has voted on yet.
    pub fn new(target: TargetRef) -> Self {
        Self {
            target,
            upvotes: 0,
            downvotes: 0,
            voters: Voters::new(),
            version: 0,
        }
    }

    pub fn counts(&self) -> VoteCounts {
        VoteCounts {
            upvotes: self.upvotes,
            downvotes: self.downvotes,
        }
    }

    pub fn vote_of(&self, identity: &str) -> Option<VoteKind> {
        self.voters.get(identity).copied()
    }

    /// Recounts the voters map, ignoring the cached counters.
    pub fn tally(&self) -> VoteCounts {
        self.voters.values().fold(VoteCounts::default(), |mut acc, kind| {
            match kind {
                VoteKind::Upvote => acc.upvotes += 1,
                VoteKind::Downvote => acc.downvotes += 1,
            }
            acc
        })
    }

    /// Whether the cached counters agree with the voters map.
    pub fn is_consistent(&self) -> bool {
        self.tally() == self.counts()
    }
}
