//! `BoardService` drives the ledger and the ownership guard against the
//! repositories.
//!
//! It owns the read-modify-write cycle for votes: load the target, compute
//! the next state, commit it, and on a version conflict start over from
//! fresh state.
use std::{sync::Arc, time::Duration};

use board_repository::{ContentRepository, ReportRepository, RepositoryError, VoteRepository};
use board_shared::types::{
    Category, CommentId, CommentView, CreatedComment, Identity, NewComment, NewPost, NewReport,
    PlatformOverview, PlatformStats, Post, PostFilter, PostId, Report, ReportStatus, TargetRef,
    VoteCounts, VoteKind,
};
use rand::Rng;
use tokio_retry::{
    RetryIf,
    strategy::{FixedInterval, jitter},
};
use tracing::{debug, info, warn};

use crate::{errors::ServiceError, ledger::VoteLedger, ownership::OwnershipGuard};

/// Number of reports shown on the admin dashboard.
const RECENT_REPORTS_LIMIT: usize = 10;

/// Tunables for [`BoardService`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Extra attempts after a vote commit hits a version conflict.
    pub vote_retry_attempts: usize,
    /// Base delay between conflict retries (jittered).
    pub vote_retry_delay: Duration,
    /// Pending reports that auto-flag a target. `0` disables auto-flagging.
    pub report_flag_threshold: u64,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            vote_retry_attempts: 3,
            vote_retry_delay: Duration::from_millis(10),
            report_flag_threshold: 0,
        }
    }
}

/// A post as submitted by a client, before validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostDraft {
    pub content: String,
    pub category: Category,
    pub tags: Vec<String>,
    pub alias: Option<String>,
}

pub struct BoardService {
    votes: Arc<dyn VoteRepository>,
    content: Arc<dyn ContentRepository>,
    reports: Arc<dyn ReportRepository>,
    ledger: VoteLedger,
    guard: OwnershipGuard,
    settings: ServiceSettings,
}

impl BoardService {
    pub fn new(
        votes: Arc<dyn VoteRepository>,
        content: Arc<dyn ContentRepository>,
        reports: Arc<dyn ReportRepository>,
        settings: ServiceSettings,
    ) -> Self {
        Self {
            votes,
            content,
            reports,
            ledger: VoteLedger::new(),
            guard: OwnershipGuard::new(),
            settings,
        }
    }

    /// Builds a service whose three repositories are the same backend.
    pub fn from_repository<R>(repository: Arc<R>, settings: ServiceSettings) -> Self
    where
        R: VoteRepository + ContentRepository + ReportRepository + 'static,
    {
        Self::new(repository.clone(), repository.clone(), repository, settings)
    }

    pub fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Casts, retracts or switches `identity`'s vote on `target`.
    ///
    /// # Returns
    ///
    /// * `Ok(VoteCounts)` - Counters after the committed transition
    /// * `Err(ServiceError::NotFound)` - No such target
    /// * `Err(ServiceError::Conflict)` - Still losing the race after all retries
    pub async fn vote(
        &self,
        target: TargetRef,
        identity: &Identity,
        kind: VoteKind,
    ) -> Result<VoteCounts, ServiceError> {
        let strategy = FixedInterval::new(self.settings.vote_retry_delay)
            .map(jitter)
            .take(self.settings.vote_retry_attempts);

        let counts = RetryIf::spawn(
            strategy,
            || self.try_vote(target, identity, kind),
            |e: &RepositoryError| {
                if e.is_conflict() {
                    debug!(target_ref = %target, "Vote commit lost a race, retrying");
                }
                e.is_conflict()
            },
        )
        .await
        .inspect_err(|e| {
            if e.is_conflict() {
                warn!(target_ref = %target, "Vote retries exhausted");
            }
        })?;

        Ok(counts)
    }

    async fn try_vote(
        &self,
        target: TargetRef,
        identity: &Identity,
        kind: VoteKind,
    ) -> Result<VoteCounts, RepositoryError> {
        let current = self.votes.load_target(target).await?;
        let outcome = self.ledger.apply_vote(&current, identity, kind);
        self.votes.commit_target(&outcome.next).await?;

        debug!(
            target_ref = %target,
            transition = ?outcome.transition,
            upvotes = outcome.next.upvotes,
            downvotes = outcome.next.downvotes,
            "Vote committed"
        );
        Ok(outcome.next.counts())
    }

    pub async fn create_post(&self, draft: PostDraft) -> Result<Post, ServiceError> {
        let content = require_text(&draft.content, "Content is required")?;
        let tags = draft
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let post = self
            .content
            .insert_post(NewPost {
                content,
                category: draft.category,
                tags,
                alias: resolve_alias(draft.alias.as_deref()),
            })
            .await?;

        info!(post_id = %post.id, category = %post.category, "Post created");
        Ok(post)
    }

    pub async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, ServiceError> {
        Ok(self.content.list_posts(filter).await?)
    }

    pub async fn get_post(&self, id: PostId) -> Result<Post, ServiceError> {
        self.content
            .get_post(id)
            .await?
            .ok_or_else(|| ServiceError::NotFound(TargetRef::post(id).to_string()))
    }

    pub async fn list_comments(&self, post_id: PostId) -> Result<Vec<CommentView>, ServiceError> {
        self.ensure_exists(TargetRef::post(post_id)).await?;
        Ok(self.content.list_comments(post_id).await?)
    }

    /// Creates a comment and issues its edit token.
    ///
    /// The returned [`CreatedComment`] is the only place the token is ever
    /// exposed; the client must keep it to edit later.
    pub async fn create_comment(
        &self,
        post_id: PostId,
        content: &str,
        alias: Option<&str>,
    ) -> Result<CreatedComment, ServiceError> {
        let content = require_text(content, "Content is required")?;
        let edit_token = self.guard.issue_token();

        let owned = self
            .content
            .insert_comment(NewComment {
                post_id,
                content,
                alias: resolve_alias(alias),
                edit_token: edit_token.clone(),
            })
            .await?;

        info!(post_id = %post_id, comment_id = %owned.id, "Comment created");
        Ok(CreatedComment {
            comment: CommentView::from(&owned),
            edit_token,
        })
    }

    /// Replaces the text of a comment if `supplied_token` proves ownership.
    ///
    /// # Returns
    ///
    /// * `Ok(CommentView)` - The comment after the edit
    /// * `Err(ServiceError::NotFound)` - No such comment
    /// * `Err(ServiceError::Forbidden)` - Token absent, empty or wrong; nothing written
    /// * `Err(ServiceError::Validation)` - Blank text from the owner; nothing written
    pub async fn edit_comment(
        &self,
        id: CommentId,
        new_text: &str,
        supplied_token: &str,
    ) -> Result<CommentView, ServiceError> {
        let current = self.content.load_content(id).await?;

        let updated = self
            .guard
            .apply_edit(&current, new_text, supplied_token)
            .inspect_err(|_| warn!(comment_id = %id, "Rejected comment edit"))?;
        require_text(&updated.content, "Content is required")?;
        self.content.commit_content(&updated).await?;

        let stored = self.content.load_content(id).await?;
        info!(comment_id = %id, "Comment edited");
        Ok(CommentView::from(&stored))
    }

    /// Files a report and flags the target once enough reports are pending.
    pub async fn submit_report(&self, target: TargetRef, reason: &str) -> Result<Report, ServiceError> {
        let reason = require_text(reason, "Reason is required")?;
        self.ensure_exists(target).await?;

        let report = self.reports.insert_report(NewReport { target, reason }).await?;
        info!(report_id = %report.id, target_ref = %target, "Report submitted");

        let threshold = self.settings.report_flag_threshold;
        if threshold > 0 {
            let pending = self.reports.count_pending_reports_for(target).await?;
            if pending >= threshold {
                self.content.set_flagged(target, true).await?;
                warn!(target_ref = %target, pending, "Target flagged after repeated reports");
            }
        }

        Ok(report)
    }

    pub async fn platform_stats(&self) -> Result<PlatformStats, ServiceError> {
        let (total_posts, total_comments, total_reports, pending_reports, recent_reports) = tokio::try_join!(
            self.content.count_posts(),
            self.content.count_comments(),
            self.reports.count_reports(None),
            self.reports.count_reports(Some(ReportStatus::Pending)),
            self.reports.recent_reports(RECENT_REPORTS_LIMIT),
        )?;

        Ok(PlatformStats {
            overview: PlatformOverview {
                total_posts,
                total_comments,
                total_reports,
                pending_reports,
            },
            recent_reports,
        })
    }

    async fn ensure_exists(&self, target: TargetRef) -> Result<(), ServiceError> {
        if self.content.target_exists(target).await? {
            Ok(())
        } else {
            Err(ServiceError::NotFound(target.to_string()))
        }
    }
}

fn require_text(raw: &str, message: &str) -> Result<String, ServiceError> {
    if raw.trim().is_empty() {
        return Err(ServiceError::Validation(message.to_string()));
    }
    Ok(raw.to_string())
}

/// Uses the supplied alias when present, otherwise a random `User<n>`.
fn resolve_alias(alias: Option<&str>) -> String {
    match alias.map(str::trim) {
        Some(alias) if !alias.is_empty() => alias.to_string(),
        _ => format!("User{}", rand::thread_rng().gen_range(0..10000)),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use async_trait::async_trait;
    use board_repository::InMemoryRepository;
    use board_shared::types::Votable;
    use uuid::Uuid;

    fn settings() -> ServiceSettings {
        ServiceSettings {
            vote_retry_attempts: 3,
            vote_retry_delay: Duration::from_millis(1),
            report_flag_threshold: 0,
        }
    }

    fn service() -> (BoardService, Arc<InMemoryRepository>) {
        let repository = Arc::new(InMemoryRepository::new());
        (
            BoardService::from_repository(repository.clone(), settings()),
            repository,
        )
    }

    fn draft(content: &str) -> PostDraft {
        PostDraft {
            content: content.to_string(),
            category: Category::Other,
            tags: vec![],
            alias: None,
        }
    }

    fn id(raw: &str) -> Identity {
        Identity::parse(raw).unwrap()
    }

    /// Fails the first `conflicts` commits the way a concurrent writer would.
    struct ContendedVotes {
        inner: Arc<InMemoryRepository>,
        conflicts: usize,
        commits: AtomicUsize,
    }

    #[async_trait]
    impl VoteRepository for ContendedVotes {
        async fn load_target(&self, target: TargetRef) -> Result<Votable, RepositoryError> {
            self.inner.load_target(target).await
        }

        async fn commit_target(&self, votable: &Votable) -> Result<(), RepositoryError> {
            let attempt = self.commits.fetch_add(1, Ordering::SeqCst);
            if attempt < self.conflicts {
                // Another identity sneaks in between our load and commit.
                let mut rival = self.inner.load_target(votable.target).await?;
                rival.voters.insert(format!("rival-{attempt}"), VoteKind::Downvote);
                rival.downvotes += 1;
                self.inner.commit_target(&rival).await?;
            }
            self.inner.commit_target(votable).await
        }
    }

    fn contended_service(conflicts: usize) -> (BoardService, Arc<InMemoryRepository>, Arc<ContendedVotes>) {
        let repository = Arc::new(InMemoryRepository::new());
        let votes = Arc::new(ContendedVotes {
            inner: repository.clone(),
            conflicts,
            commits: AtomicUsize::new(0),
        });
        let service = BoardService::new(votes.clone(), repository.clone(), repository.clone(), settings());
        (service, repository, votes)
    }

    #[tokio::test]
    async fn test_vote_scenario_on_comment() {
        let (service, repository) = service();
        let post = service.create_post(draft("post")).await.unwrap();
        let comment = service.create_comment(post.id, "c", Some("X")).await.unwrap();
        let target = TargetRef::comment(comment.comment.id);

        let counts = service.vote(target, &id("A"), VoteKind::Upvote).await.unwrap();
        assert_eq!((counts.upvotes, counts.downvotes), (1, 0));
        let counts = service.vote(target, &id("B"), VoteKind::Downvote).await.unwrap();
        assert_eq!((counts.upvotes, counts.downvotes), (1, 1));
        let counts = service.vote(target, &id("A"), VoteKind::Downvote).await.unwrap();
        assert_eq!((counts.upvotes, counts.downvotes), (0, 2));
        let counts = service.vote(target, &id("A"), VoteKind::Downvote).await.unwrap();
        assert_eq!((counts.upvotes, counts.downvotes), (0, 1));

        let stored = repository.load_target(target).await.unwrap();
        assert_eq!(stored.voters.len(), 1);
        assert_eq!(stored.vote_of("B"), Some(VoteKind::Downvote));
        assert_eq!(stored.version, 4);
    }

    #[tokio::test]
    async fn test_vote_on_missing_target_is_not_found() {
        let (service, _) = service();
        let err = service
            .vote(TargetRef::post(Uuid::new_v4()), &id("A"), VoteKind::Upvote)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_vote_retries_from_fresh_state_after_conflict() {
        let (service, repository, votes) = contended_service(2);
        let post = service.create_post(draft("post")).await.unwrap();
        let target = TargetRef::post(post.id);

        let counts = service.vote(target, &id("A"), VoteKind::Upvote).await.unwrap();

        assert_eq!(counts, VoteCounts { upvotes: 1, downvotes: 2 });
        assert_eq!(votes.commits.load(Ordering::SeqCst), 3);
        let stored = repository.load_target(target).await.unwrap();
        assert!(stored.is_consistent());
        assert_eq!(stored.voters.len(), 3);
    }

    #[tokio::test]
    async fn test_vote_surfaces_conflict_when_retries_exhausted() {
        let (service, repository, votes) = contended_service(usize::MAX);
        let post = service.create_post(draft("post")).await.unwrap();
        let target = TargetRef::post(post.id);

        let err = service
            .vote(target, &id("A"), VoteKind::Upvote)
            .await
            .unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(votes.commits.load(Ordering::SeqCst), 4);
        let stored = repository.load_target(target).await.unwrap();
        assert_eq!(stored.vote_of("A"), None);
        assert!(stored.is_consistent());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_votes_do_not_drift() {
        let repository = Arc::new(InMemoryRepository::new());
        let service = Arc::new(BoardService::from_repository(
            repository.clone(),
            ServiceSettings {
                vote_retry_attempts: 500,
                vote_retry_delay: Duration::from_millis(1),
                report_flag_threshold: 0,
            },
        ));
        let post = service.create_post(draft("popular")).await.unwrap();
        let target = TargetRef::post(post.id);

        let mut handles = Vec::new();
        for i in 0..40 {
            let service = service.clone();
            let kind = if i % 4 == 0 {
                VoteKind::Downvote
            } else {
                VoteKind::Upvote
            };
            handles.push(tokio::spawn(async move {
                service.vote(target, &id(&format!("user-{i}")), kind).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = repository.load_target(target).await.unwrap();
        assert_eq!(stored.counts(), VoteCounts { upvotes: 30, downvotes: 10 });
        assert!(stored.is_consistent());
    }

    #[tokio::test]
    async fn test_edit_comment_with_issued_token() {
        let (service, _) = service();
        let post = service.create_post(draft("post")).await.unwrap();
        let created = service.create_comment(post.id, "hello", Some("X")).await.unwrap();
        let comment_id = created.comment.id;

        let err = service
            .edit_comment(comment_id, "hello2", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));
        let comments = service.list_comments(post.id).await.unwrap();
        assert_eq!(comments[0].content, "hello");

        let edited = service
            .edit_comment(comment_id, "hello2", created.edit_token.as_str())
            .await
            .unwrap();
        assert_eq!(edited.content, "hello2");
        assert_eq!(edited.alias, "X");
    }

    #[tokio::test]
    async fn test_edit_keeps_votes_and_token() {
        let (service, repository) = service();
        let post = service.create_post(draft("post")).await.unwrap();
        let created = service.create_comment(post.id, "hello", None).await.unwrap();
        let comment_id = created.comment.id;
        service
            .vote(TargetRef::comment(comment_id), &id("A"), VoteKind::Upvote)
            .await
            .unwrap();

        service
            .edit_comment(comment_id, "hello2", created.edit_token.as_str())
            .await
            .unwrap();

        let stored = repository.load_content(comment_id).await.unwrap();
        assert_eq!(stored.upvotes, 1);
        assert_eq!(stored.edit_token, Some(created.edit_token));
    }

    #[tokio::test]
    async fn test_blank_edit_checks_existence_and_token_first() {
        let (service, _) = service();
        let post = service.create_post(draft("post")).await.unwrap();
        let created = service.create_comment(post.id, "hello", None).await.unwrap();
        let comment_id = created.comment.id;

        let err = service.edit_comment(comment_id, "", "wrong").await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));

        let err = service.edit_comment(Uuid::new_v4(), "", "x").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = service
            .edit_comment(comment_id, "  ", created.edit_token.as_str())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let comments = service.list_comments(post.id).await.unwrap();
        assert_eq!(comments[0].content, "hello");
    }

    #[tokio::test]
    async fn test_edit_missing_comment_is_not_found() {
        let (service, _) = service();
        let err = service
            .edit_comment(Uuid::new_v4(), "text", "token")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_legacy_comment_cannot_be_edited() {
        let (service, repository) = service();
        let post = service.create_post(draft("post")).await.unwrap();
        let legacy = repository.insert_legacy_comment(post.id, "old", "X").await;

        let err = service.edit_comment(legacy.id, "new", "").await.unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden));
    }

    #[tokio::test]
    async fn test_create_post_validates_and_defaults_alias() {
        let (service, _) = service();
        let err = service.create_post(draft("   ")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));

        let post = service
            .create_post(PostDraft {
                content: "hi".to_string(),
                category: Category::Faith,
                tags: vec![" hope ".to_string(), "".to_string()],
                alias: Some("  ".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(post.tags, vec!["hope".to_string()]);
        assert!(post.alias.starts_with("User"));
        assert!(post.alias["User".len()..].parse::<u32>().unwrap() < 10000);
    }

    #[tokio::test]
    async fn test_comment_on_missing_post_is_not_found() {
        let (service, _) = service();
        let err = service
            .create_comment(Uuid::new_v4(), "hello", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = service.list_comments(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_reports_flag_target_at_threshold() {
        let repository = Arc::new(InMemoryRepository::new());
        let service = BoardService::from_repository(
            repository.clone(),
            ServiceSettings {
                report_flag_threshold: 2,
                ..settings()
            },
        );
        let post = service.create_post(draft("post")).await.unwrap();
        let target = TargetRef::post(post.id);

        service.submit_report(target, "spam").await.unwrap();
        assert!(!service.get_post(post.id).await.unwrap().flagged);
        service.submit_report(target, "abuse").await.unwrap();
        assert!(service.get_post(post.id).await.unwrap().flagged);

        let err = service.submit_report(target, " ").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        let err = service
            .submit_report(TargetRef::comment(Uuid::new_v4()), "spam")
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_platform_stats() {
        let (service, _) = service();
        let post = service.create_post(draft("post")).await.unwrap();
        service.create_comment(post.id, "c1", None).await.unwrap();
        service.create_comment(post.id, "c2", None).await.unwrap();
        service
            .submit_report(TargetRef::post(post.id), "spam")
            .await
            .unwrap();

        let stats = service.platform_stats().await.unwrap();
        assert_eq!(
            stats.overview,
            PlatformOverview {
                total_posts: 1,
                total_comments: 2,
                total_reports: 1,
                pending_reports: 1,
            }
        );
        assert_eq!(stats.recent_reports.len(), 1);
    }
}
