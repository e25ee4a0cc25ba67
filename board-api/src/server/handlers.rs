// HTTP request handlers
use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use board_core::PostDraft;
use board_shared::types::{
    CommentId, CommentView, CreatedComment, Identity, PlatformStats, Post, PostFilter, PostId,
    Report, TargetRef, VoteCounts,
};
use tracing::info;

use crate::errors::ApiError;
use crate::server::models::{
    CreateCommentRequest, CreatePostRequest, CreateReportRequest, EditCommentRequest,
    ListPostsQuery, VoteRequest,
};
use crate::server::state::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "Anonymous board API is running")
}

pub async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Post>>> {
    let Query(query) = query?;
    let filter = PostFilter::try_from(query)?;
    Ok(Json(state.service.list_posts(&filter).await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Post>)> {
    let Json(request) = payload?;
    let post = state
        .service
        .create_post(PostDraft {
            content: request.content,
            category: request.category,
            tags: request.tags,
            alias: request.alias,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn get_post(
    State(state): State<AppState>,
    id: Result<Path<PostId>, PathRejection>,
) -> ApiResult<Json<Post>> {
    let Path(id) = id?;
    Ok(Json(state.service.get_post(id).await?))
}

pub async fn vote_post(
    State(state): State<AppState>,
    id: Result<Path<PostId>, PathRejection>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<Json<VoteCounts>> {
    let Path(id) = id?;
    vote(&state, TargetRef::post(id), payload).await
}

pub async fn vote_comment(
    State(state): State<AppState>,
    id: Result<Path<CommentId>, PathRejection>,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<Json<VoteCounts>> {
    let Path(id) = id?;
    vote(&state, TargetRef::comment(id), payload).await
}

async fn vote(
    state: &AppState,
    target: TargetRef,
    payload: Result<Json<VoteRequest>, JsonRejection>,
) -> ApiResult<Json<VoteCounts>> {
    let Json(request) = payload?;
    let identity = Identity::parse(request.user_id)
        .map_err(|e| ApiError::BadRequest(e.to_string()))?;
    let counts = state.service.vote(target, &identity, request.kind).await?;
    Ok(Json(counts))
}

pub async fn list_comments(
    State(state): State<AppState>,
    id: Result<Path<PostId>, PathRejection>,
) -> ApiResult<Json<Vec<CommentView>>> {
    let Path(id) = id?;
    Ok(Json(state.service.list_comments(id).await?))
}

/// Creates a comment. The response is the only time the edit token is sent.
pub async fn create_comment(
    State(state): State<AppState>,
    id: Result<Path<PostId>, PathRejection>,
    payload: Result<Json<CreateCommentRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreatedComment>)> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let created = state
        .service
        .create_comment(id, &request.content, request.alias.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn edit_comment(
    State(state): State<AppState>,
    id: Result<Path<CommentId>, PathRejection>,
    payload: Result<Json<EditCommentRequest>, JsonRejection>,
) -> ApiResult<Json<CommentView>> {
    let Path(id) = id?;
    let Json(request) = payload?;
    let comment = state
        .service
        .edit_comment(id, &request.content, &request.edit_token)
        .await?;
    Ok(Json(comment))
}

pub async fn create_report(
    State(state): State<AppState>,
    payload: Result<Json<CreateReportRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    let Json(request) = payload?;
    let report = state
        .service
        .submit_report(request.target(), &request.reason)
        .await?;
    Ok((StatusCode::CREATED, Json(report)))
}

pub async fn platform_stats(State(state): State<AppState>) -> ApiResult<Json<PlatformStats>> {
    let stats = state.service.platform_stats().await?;
    info!(
        total_posts = stats.overview.total_posts,
        pending_reports = stats.overview.pending_reports,
        "Served platform stats"
    );
    Ok(Json(stats))
}
