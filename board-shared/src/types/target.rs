use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type PostId = Uuid;
pub type CommentId = Uuid;
pub type ReportId = Uuid;

/// The kind of content a vote or report points at.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TargetKind {
    Post,
    Comment,
}

impl TargetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetKind::Post => "Post",
            TargetKind::Comment => "Comment",
        }
    }
}

/// Identifies a single votable or reportable record.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct TargetRef {
    pub kind: TargetKind,
    pub id: Uuid,
}

impl TargetRef {
    pub fn post(id: PostId) -> Self {
        Self { kind: TargetKind::Post, id }
    }

    pub fn comment(id: CommentId) -> Self {
        Self { kind: TargetKind::Comment, id }
    }
}

impl fmt::Display for TargetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.as_str(), self.id)
    }
}
