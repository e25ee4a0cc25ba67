//! In-memory implementation of the board repositories.
//!
//! Backs local development and tests without a database. All records live
//! behind a single `RwLock`, so every commit (version check plus write) runs
//! under one write guard and concurrent vote commits serialize.
use std::collections::HashMap;

use async_trait::async_trait;
use board_shared::types::{
    CommentId, CommentView, NewComment, NewPost, NewReport, OwnedContent, Post, PostFilter, PostId,
    Report, ReportStatus, TargetKind, TargetRef, Votable, Voters,
};
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{ContentRepository, ReportRepository, RepositoryError, VoteRepository};

/// Vote bookkeeping stored next to each post or comment.
#[derive(Debug, Default)]
struct VoteState {
    voters: Voters,
    version: u64,
}

#[derive(Debug)]
struct PostRecord {
    seq: u64,
    post: Post,
    votes: VoteState,
}

#[derive(Debug)]
struct CommentRecord {
    seq: u64,
    content: OwnedContent,
    votes: VoteState,
}

#[derive(Debug, Default)]
struct Store {
    next_seq: u64,
    posts: HashMap<PostId, PostRecord>,
    comments: HashMap<CommentId, CommentRecord>,
    reports: Vec<Report>,
}

impl Store {
    fn next_seq(&mut self) -> u64 {
        self.next_seq += 1;
        self.next_seq
    }
}

/// Repository that keeps every record in process memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a comment that predates edit tokens. Such comments can never be edited.
    pub async fn insert_legacy_comment(&self, post_id: PostId, content: &str, alias: &str) -> OwnedContent {
        let mut store = self.store.write().await;
        let now = Utc::now();
        let owned = OwnedContent {
            id: Uuid::new_v4(),
            post_id,
            content: content.to_string(),
            alias: alias.to_string(),
            upvotes: 0,
            downvotes: 0,
            flagged: false,
            edit_token: None,
            created_at: now,
            updated_at: now,
        };
        let seq = store.next_seq();
        store.comments.insert(
            owned.id,
            CommentRecord {
                seq,
                content: owned.clone(),
                votes: VoteState::default(),
            },
        );
        owned
    }
}

fn not_found(target: TargetRef) -> RepositoryError {
    RepositoryError::NotFound(target.to_string())
}

#[async_trait]
impl VoteRepository for InMemoryRepository {
    async fn load_target(&self, target: TargetRef) -> Result<Votable, RepositoryError> {
        let store = self.store.read().await;
        let (upvotes, downvotes, votes) = match target.kind {
            TargetKind::Post => store
                .posts
                .get(&target.id)
                .map(|r| (r.post.upvotes, r.post.downvotes, &r.votes)),
            TargetKind::Comment => store
                .comments
                .get(&target.id)
                .map(|r| (r.content.upvotes, r.content.downvotes, &r.votes)),
        }
        .ok_or_else(|| not_found(target))?;

        Ok(Votable {
            target,
            upvotes,
            downvotes,
            voters: votes.voters.clone(),
            version: votes.version,
        })
    }

    async fn commit_target(&self, votable: &Votable) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        let target = votable.target;
        let (upvotes, downvotes, votes) = match target.kind {
            TargetKind::Post => store
                .posts
                .get_mut(&target.id)
                .map(|r| (&mut r.post.upvotes, &mut r.post.downvotes, &mut r.votes)),
            TargetKind::Comment => store
                .comments
                .get_mut(&target.id)
                .map(|r| (&mut r.content.upvotes, &mut r.content.downvotes, &mut r.votes)),
        }
        .ok_or_else(|| not_found(target))?;

        if votes.version != votable.version {
            return Err(RepositoryError::Conflict(target.to_string()));
        }

        *upvotes = votable.upvotes;
        *downvotes = votable.downvotes;
        votes.voters = votable.voters.clone();
        votes.version += 1;
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for InMemoryRepository {
    async fn insert_post(&self, post: NewPost) -> Result<Post, RepositoryError> {
        let mut store = self.store.write().await;
        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            content: post.content,
            category: post.category,
            tags: post.tags,
            alias: post.alias,
            upvotes: 0,
            downvotes: 0,
            flagged: false,
            created_at: now,
            updated_at: now,
        };
        let seq = store.next_seq();
        store.posts.insert(
            post.id,
            PostRecord {
                seq,
                post: post.clone(),
                votes: VoteState::default(),
            },
        );
        Ok(post)
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let store = self.store.read().await;
        Ok(store.posts.get(&id).map(|r| r.post.clone()))
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, RepositoryError> {
        let store = self.store.read().await;
        let mut records: Vec<&PostRecord> = store
            .posts
            .values()
            .filter(|r| filter.matches(&r.post))
            .collect();
        records.sort_by(|a, b| {
            b.post
                .created_at
                .cmp(&a.post.created_at)
                .then(b.seq.cmp(&a.seq))
        });
        Ok(records.into_iter().map(|r| r.post.clone()).collect())
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<OwnedContent, RepositoryError> {
        let mut store = self.store.write().await;
        if !store.posts.contains_key(&comment.post_id) {
            return Err(not_found(TargetRef::post(comment.post_id)));
        }
        let now = Utc::now();
        let owned = OwnedContent {
            id: Uuid::new_v4(),
            post_id: comment.post_id,
            content: comment.content,
            alias: comment.alias,
            upvotes: 0,
            downvotes: 0,
            flagged: false,
            edit_token: Some(comment.edit_token),
            created_at: now,
            updated_at: now,
        };
        let seq = store.next_seq();
        store.comments.insert(
            owned.id,
            CommentRecord {
                seq,
                content: owned.clone(),
                votes: VoteState::default(),
            },
        );
        Ok(owned)
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<CommentView>, RepositoryError> {
        let store = self.store.read().await;
        let mut records: Vec<&CommentRecord> = store
            .comments
            .values()
            .filter(|r| r.content.post_id == post_id)
            .collect();
        records.sort_by(|a, b| {
            a.content
                .created_at
                .cmp(&b.content.created_at)
                .then(a.seq.cmp(&b.seq))
        });
        Ok(records.into_iter().map(|r| CommentView::from(&r.content)).collect())
    }

    async fn load_content(&self, id: CommentId) -> Result<OwnedContent, RepositoryError> {
        let store = self.store.read().await;
        store
            .comments
            .get(&id)
            .map(|r| r.content.clone())
            .ok_or_else(|| not_found(TargetRef::comment(id)))
    }

    async fn commit_content(&self, content: &OwnedContent) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        let record = store
            .comments
            .get_mut(&content.id)
            .ok_or_else(|| not_found(TargetRef::comment(content.id)))?;
        record.content.content = content.content.clone();
        record.content.updated_at = Utc::now();
        Ok(())
    }

    async fn target_exists(&self, target: TargetRef) -> Result<bool, RepositoryError> {
        let store = self.store.read().await;
        Ok(match target.kind {
            TargetKind::Post => store.posts.contains_key(&target.id),
            TargetKind::Comment => store.comments.contains_key(&target.id),
        })
    }

    async fn set_flagged(&self, target: TargetRef, flagged: bool) -> Result<(), RepositoryError> {
        let mut store = self.store.write().await;
        let slot = match target.kind {
            TargetKind::Post => store.posts.get_mut(&target.id).map(|r| &mut r.post.flagged),
            TargetKind::Comment => store
                .comments
                .get_mut(&target.id)
                .map(|r| &mut r.content.flagged),
        }
        .ok_or_else(|| not_found(target))?;
        *slot = flagged;
        Ok(())
    }

    async fn count_posts(&self) -> Result<u64, RepositoryError> {
        Ok(self.store.read().await.posts.len() as u64)
    }

    async fn count_comments(&self) -> Result<u64, RepositoryError> {
        Ok(self.store.read().await.comments.len() as u64)
    }
}

#[async_trait]
impl ReportRepository for InMemoryRepository {
    async fn insert_report(&self, report: NewReport) -> Result<Report, RepositoryError> {
        let mut store = self.store.write().await;
        let report = Report {
            id: Uuid::new_v4(),
            target_id: report.target.id,
            target_type: report.target.kind,
            reason: report.reason,
            status: ReportStatus::Pending,
            created_at: Utc::now(),
        };
        store.reports.push(report.clone());
        Ok(report)
    }

    async fn count_reports(&self, status: Option<ReportStatus>) -> Result<u64, RepositoryError> {
        let store = self.store.read().await;
        let count = store
            .reports
            .iter()
            .filter(|r| status.is_none_or(|s| r.status == s))
            .count();
        Ok(count as u64)
    }

    async fn count_pending_reports_for(&self, target: TargetRef) -> Result<u64, RepositoryError> {
        let store = self.store.read().await;
        let count = store
            .reports
            .iter()
            .filter(|r| r.status == ReportStatus::Pending && r.target() == target)
            .count();
        Ok(count as u64)
    }

    async fn recent_reports(&self, limit: usize) -> Result<Vec<Report>, RepositoryError> {
        let store = self.store.read().await;
        // Reports are appended in creation order.
        Ok(store.reports.iter().rev().take(limit).cloned().collect())
    }
}
