//! This module defines the `ContentRepository` trait for posts and comments.
use async_trait::async_trait;
use board_shared::types::{
    CommentId, CommentView, NewComment, NewPost, OwnedContent, Post, PostFilter, PostId, TargetRef,
};

use crate::errors::RepositoryError;

/// A trait that defines the interface for storing posts and comments.
///
/// Comments have two read paths: `list_comments` returns public projections,
/// while `load_content` is the internal fetch that includes the edit token.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    async fn insert_post(&self, post: NewPost) -> Result<Post, RepositoryError>;

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, RepositoryError>;

    /// Returns posts matching `filter`, newest first.
    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, RepositoryError>;

    async fn insert_comment(&self, comment: NewComment) -> Result<OwnedContent, RepositoryError>;

    /// Returns the comments of a post, oldest first.
    async fn list_comments(&self, post_id: PostId) -> Result<Vec<CommentView>, RepositoryError>;

    /// Internal fetch of a comment including its edit token.
    async fn load_content(&self, id: CommentId) -> Result<OwnedContent, RepositoryError>;

    /// Persists the text of an edited comment.
    ///
    /// Only `content` (and the update timestamp) is written, so concurrent
    /// vote commits on the same comment are never overwritten.
    async fn commit_content(&self, content: &OwnedContent) -> Result<(), RepositoryError>;

    async fn target_exists(&self, target: TargetRef) -> Result<bool, RepositoryError>;

    async fn set_flagged(&self, target: TargetRef, flagged: bool) -> Result<(), RepositoryError>;

    async fn count_posts(&self) -> Result<u64, RepositoryError>;

    async fn count_comments(&self) -> Result<u64, RepositoryError>;
}
