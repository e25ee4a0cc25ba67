use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{Category, CommentId, EditToken, PostId};

/// A top-level anonymous post.
///
/// Holds no identity-to-vote linkage and no secrets, so it doubles as its own
/// public projection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: PostId,
    pub content: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub alias: String,
    pub upvotes: u64,
    pub downvotes: u64,
    pub flagged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a post. Validation and alias defaulting
/// happen before this reaches a repository.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewPost {
    pub content: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub alias: String,
}

/// Feed filter: optional category plus an optional case-insensitive search
/// over content and tags.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PostFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
}

impl PostFilter {
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(category) = self.category {
            if post.category != category {
                return false;
            }
        }

        match self.search.as_deref().map(str::to_lowercase) {
            Some(needle) if !needle.is_empty() => {
                post.content.to_lowercase().contains(&needle)
                    || post.tags.iter().any(|t| t.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

/// Internal comment record, including its edit token.
///
/// Only the ownership check reads this shape; everything returned to clients
/// goes through [`CommentView`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedContent {
    pub id: CommentId,
    pub post_id: PostId,
    pub content: String,
    pub alias: String,
    pub upvotes: u64,
    pub downvotes: u64,
    pub flagged: bool,
    /// `None` for records created before tokens existed.
    pub edit_token: Option<EditToken>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a comment. Never carries the edit token.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    pub id: CommentId,
    pub post_id: PostId,
    pub content: String,
    pub alias: String,
    pub upvotes: u64,
    pub downvotes: u64,
    pub flagged: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&OwnedContent> for CommentView {
    fn from(content: &OwnedContent) -> Self {
        Self {
            id: content.id,
            post_id: content.post_id,
            content: content.content.clone(),
            alias: content.alias.clone(),
            upvotes: content.upvotes,
            downvotes: content.downvotes,
            flagged: content.flagged,
            created_at: content.created_at,
            updated_at: content.updated_at,
        }
    }
}

/// The creation response: the one and only time the edit token leaves the server.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreatedComment {
    #[serde(flatten)]
    pub comment: CommentView,
    pub edit_token: EditToken,
}

/// Fields persisted when creating a comment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewComment {
    pub post_id: PostId,
    pub content: String,
    pub alias: String,
    pub edit_token: EditToken,
}
