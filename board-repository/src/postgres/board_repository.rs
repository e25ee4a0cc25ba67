//! PostgreSQL implementation of the board repositories.
//!
//! Provides a PostgreSQL backend for `VoteRepository`, `ContentRepository`
//! and `ReportRepository` over a shared `sqlx::PgPool`.
//!
//! ## Key Features
//!
//! - Voters map stored as `JSONB` on the post/comment row itself, so the map
//!   and both counters change in one single-row `UPDATE`
//! - Optimistic concurrency through a `version` column
//! - Edit tokens only selected by `load_content`
//!
//! ## Database Tables
//!
//! - `posts`: Posts with their vote state
//! - `comments`: Comments with their vote state and edit token
//! - `reports`: Abuse reports against posts or comments
use async_trait::async_trait;
use board_shared::types::{
    Category, CommentId, CommentView, EditToken, NewComment, NewPost, NewReport, OwnedContent, Post,
    PostFilter, PostId, Report, ReportStatus, TargetKind, TargetRef, Votable, Voters,
};
use sqlx::{Row, postgres::PgRow, types::Json};
use tracing::debug;
use uuid::Uuid;

use crate::{ContentRepository, ReportRepository, RepositoryError, VoteRepository};

const POST_COLUMNS: &str =
    "id, content, category, tags, alias, upvotes, downvotes, flagged, created_at, updated_at";
const COMMENT_COLUMNS: &str =
    "id, post_id, content, alias, upvotes, downvotes, flagged, created_at, updated_at";
const REPORT_COLUMNS: &str = "id, target_id, target_type, reason, status, created_at";

/// PostgreSQL implementation of the board repositories.
pub struct PostgresRepository {
    pool: sqlx::PgPool,
}

impl PostgresRepository {
    /// Creates a repository over an already configured pool.
    pub fn new(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `url` and creates a repository over the new pool.
    ///
    /// # Returns
    ///
    /// * `Ok(PostgresRepository)` - Ready-to-use repository instance
    /// * `Err(RepositoryError)` - Connection failure
    pub async fn connect(url: &str) -> Result<Self, RepositoryError> {
        let pool = sqlx::PgPool::connect(url).await?;
        Ok(Self { pool })
    }

    /// Applies the embedded migrations under `src/postgres/migrations`.
    pub async fn migrate(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("src/postgres/migrations")
            .run(&self.pool)
            .await?;
        Ok(())
    }
}

fn table_for(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::Post => "posts",
        TargetKind::Comment => "comments",
    }
}

fn to_u64(value: i64, column: &str) -> Result<u64, RepositoryError> {
    u64::try_from(value).map_err(|_| RepositoryError::InvalidValue(format!("{column}: {value}")))
}

fn to_i64(value: u64, column: &str) -> Result<i64, RepositoryError> {
    i64::try_from(value).map_err(|_| RepositoryError::InvalidValue(format!("{column}: {value}")))
}

fn parse_target_kind(raw: &str) -> Result<TargetKind, RepositoryError> {
    match raw {
        "Post" => Ok(TargetKind::Post),
        "Comment" => Ok(TargetKind::Comment),
        other => Err(RepositoryError::InvalidValue(format!("target_type: {other}"))),
    }
}

fn parse_report_status(raw: &str) -> Result<ReportStatus, RepositoryError> {
    match raw {
        "pending" => Ok(ReportStatus::Pending),
        "reviewed" => Ok(ReportStatus::Reviewed),
        "resolved" => Ok(ReportStatus::Resolved),
        other => Err(RepositoryError::InvalidValue(format!("status: {other}"))),
    }
}

/// Escapes `%`, `_` and `\` so user input is matched literally by `ILIKE`.
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn post_from_row(row: &PgRow) -> Result<Post, RepositoryError> {
    let category: String = row.try_get("category")?;
    Ok(Post {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
        category: category
            .parse::<Category>()
            .map_err(|e| RepositoryError::InvalidValue(e.to_string()))?,
        tags: row.try_get("tags")?,
        alias: row.try_get("alias")?,
        upvotes: to_u64(row.try_get("upvotes")?, "upvotes")?,
        downvotes: to_u64(row.try_get("downvotes")?, "downvotes")?,
        flagged: row.try_get("flagged")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn comment_view_from_row(row: &PgRow) -> Result<CommentView, RepositoryError> {
    Ok(CommentView {
        id: row.try_get("id")?,
        post_id: row.try_get("post_id")?,
        content: row.try_get("content")?,
        alias: row.try_get("alias")?,
        upvotes: to_u64(row.try_get("upvotes")?, "upvotes")?,
        downvotes: to_u64(row.try_get("downvotes")?, "downvotes")?,
        flagged: row.try_get("flagged")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn owned_content_from_row(row: &PgRow) -> Result<OwnedContent, RepositoryError> {
    let view = comment_view_from_row(row)?;
    let edit_token: Option<String> = row.try_get("edit_token")?;
    Ok(OwnedContent {
        id: view.id,
        post_id: view.post_id,
        content: view.content,
        alias: view.alias,
        upvotes: view.upvotes,
        downvotes: view.downvotes,
        flagged: view.flagged,
        edit_token: edit_token.map(EditToken::from_issued),
        created_at: view.created_at,
        updated_at: view.updated_at,
    })
}

fn report_from_row(row: &PgRow) -> Result<Report, RepositoryError> {
    let target_type: String = row.try_get("target_type")?;
    let status: String = row.try_get("status")?;
    Ok(Report {
        id: row.try_get("id")?,
        target_id: row.try_get("target_id")?,
        target_type: parse_target_kind(&target_type)?,
        reason: row.try_get("reason")?,
        status: parse_report_status(&status)?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl VoteRepository for PostgresRepository {
    /// Loads the voters map, counters and version of a post or comment.
    async fn load_target(&self, target: TargetRef) -> Result<Votable, RepositoryError> {
        let query = format!(
            "SELECT upvotes, downvotes, voters, version FROM {} WHERE id = $1",
            table_for(target.kind)
        );
        let row = sqlx::query(&query)
            .bind(target.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(target.to_string()))?;

        let voters: Json<Voters> = row.try_get("voters")?;
        Ok(Votable {
            target,
            upvotes: to_u64(row.try_get("upvotes")?, "upvotes")?,
            downvotes: to_u64(row.try_get("downvotes")?, "downvotes")?,
            voters: voters.0,
            version: to_u64(row.try_get("version")?, "version")?,
        })
    }

    /// Commits voters and counters in one conditional `UPDATE`.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - Row updated and version bumped
    /// * `Err(RepositoryError::Conflict)` - Stored version moved on since the load
    /// * `Err(RepositoryError::NotFound)` - Row no longer exists
    async fn commit_target(&self, votable: &Votable) -> Result<(), RepositoryError> {
        let target = votable.target;
        let query = format!(
            "UPDATE {} SET voters = $1, upvotes = $2, downvotes = $3, version = version + 1 \
             WHERE id = $4 AND version = $5",
            table_for(target.kind)
        );
        let result = sqlx::query(&query)
            .bind(Json(&votable.voters))
            .bind(to_i64(votable.upvotes, "upvotes")?)
            .bind(to_i64(votable.downvotes, "downvotes")?)
            .bind(target.id)
            .bind(to_i64(votable.version, "version")?)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            if self.target_exists(target).await? {
                debug!(target_ref = %target, version = votable.version, "Stale vote commit rejected");
                return Err(RepositoryError::Conflict(target.to_string()));
            }
            return Err(RepositoryError::NotFound(target.to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentRepository for PostgresRepository {
    async fn insert_post(&self, post: NewPost) -> Result<Post, RepositoryError> {
        let query = format!(
            "INSERT INTO posts (id, content, category, tags, alias) VALUES ($1, $2, $3, $4, $5) \
             RETURNING {POST_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&post.content)
            .bind(post.category.label())
            .bind(&post.tags)
            .bind(&post.alias)
            .fetch_one(&self.pool)
            .await?;
        post_from_row(&row)
    }

    async fn get_post(&self, id: PostId) -> Result<Option<Post>, RepositoryError> {
        let query = format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1");
        sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .as_ref()
            .map(post_from_row)
            .transpose()
    }

    async fn list_posts(&self, filter: &PostFilter) -> Result<Vec<Post>, RepositoryError> {
        let category = filter.category.map(|c| c.label());
        let pattern = filter
            .search
            .as_deref()
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", escape_like(s)));

        let query = format!(
            "SELECT {POST_COLUMNS} FROM posts \
             WHERE ($1::text IS NULL OR category = $1) \
             AND ($2::text IS NULL OR content ILIKE $2 \
                  OR EXISTS (SELECT 1 FROM unnest(tags) AS tag WHERE tag ILIKE $2)) \
             ORDER BY created_at DESC"
        );
        let rows = sqlx::query(&query)
            .bind(category)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(post_from_row).collect()
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<OwnedContent, RepositoryError> {
        let query = format!(
            "INSERT INTO comments (id, post_id, content, alias, edit_token) \
             SELECT $1, id, $3, $4, $5 FROM posts WHERE id = $2 \
             RETURNING {COMMENT_COLUMNS}, edit_token"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(comment.post_id)
            .bind(&comment.content)
            .bind(&comment.alias)
            .bind(comment.edit_token.as_str())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(TargetRef::post(comment.post_id).to_string()))?;
        owned_content_from_row(&row)
    }

    async fn list_comments(&self, post_id: PostId) -> Result<Vec<CommentView>, RepositoryError> {
        let query = format!(
            "SELECT {COMMENT_COLUMNS} FROM comments WHERE post_id = $1 ORDER BY created_at ASC"
        );
        let rows = sqlx::query(&query)
            .bind(post_id)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(comment_view_from_row).collect()
    }

    async fn load_content(&self, id: CommentId) -> Result<OwnedContent, RepositoryError> {
        let query = format!("SELECT {COMMENT_COLUMNS}, edit_token FROM comments WHERE id = $1");
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(TargetRef::comment(id).to_string()))?;
        owned_content_from_row(&row)
    }

    async fn commit_content(&self, content: &OwnedContent) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE comments SET content = $1, updated_at = now() WHERE id = $2")
            .bind(&content.content)
            .bind(content.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(TargetRef::comment(content.id).to_string()));
        }
        Ok(())
    }

    async fn target_exists(&self, target: TargetRef) -> Result<bool, RepositoryError> {
        let query = format!(
            "SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)",
            table_for(target.kind)
        );
        let exists: bool = sqlx::query_scalar(&query)
            .bind(target.id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn set_flagged(&self, target: TargetRef, flagged: bool) -> Result<(), RepositoryError> {
        let query = format!("UPDATE {} SET flagged = $1 WHERE id = $2", table_for(target.kind));
        let result = sqlx::query(&query)
            .bind(flagged)
            .bind(target.id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound(target.to_string()));
        }
        Ok(())
    }

    async fn count_posts(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM posts")
            .fetch_one(&self.pool)
            .await?;
        to_u64(count, "count")
    }

    async fn count_comments(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments")
            .fetch_one(&self.pool)
            .await?;
        to_u64(count, "count")
    }
}

#[async_trait]
impl ReportRepository for PostgresRepository {
    async fn insert_report(&self, report: NewReport) -> Result<Report, RepositoryError> {
        let query = format!(
            "INSERT INTO reports (id, target_id, target_type, reason) VALUES ($1, $2, $3, $4) \
             RETURNING {REPORT_COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(report.target.id)
            .bind(report.target.kind.as_str())
            .bind(&report.reason)
            .fetch_one(&self.pool)
            .await?;
        report_from_row(&row)
    }

    async fn count_reports(&self, status: Option<ReportStatus>) -> Result<u64, RepositoryError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE ($1::text IS NULL OR status = $1)")
                .bind(status.map(|s| s.as_str()))
                .fetch_one(&self.pool)
                .await?;
        to_u64(count, "count")
    }

    async fn count_pending_reports_for(&self, target: TargetRef) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM reports \
             WHERE target_type = $1 AND target_id = $2 AND status = 'pending'",
        )
        .bind(target.kind.as_str())
        .bind(target.id)
        .fetch_one(&self.pool)
        .await?;
        to_u64(count, "count")
    }

    async fn recent_reports(&self, limit: usize) -> Result<Vec<Report>, RepositoryError> {
        let query = format!("SELECT {REPORT_COLUMNS} FROM reports ORDER BY created_at DESC LIMIT $1");
        let rows = sqlx::query(&query)
            .bind(i64::try_from(limit).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(report_from_row).collect()
    }
}
