use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use board_api::server::create_app;
use board_core::{BoardService, ServiceSettings};
use board_repository::InMemoryRepository;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

fn app() -> Router {
    app_with(ServiceSettings::default())
}

fn app_with(settings: ServiceSettings) -> Router {
    let service = BoardService::from_repository(Arc::new(InMemoryRepository::new()), settings);
    create_app(Arc::new(service), &[])
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_post(app: &Router, content: &str, category: &str) -> Value {
    let (status, post) = send(
        app,
        "POST",
        "/api/posts",
        Some(json!({ "content": content, "category": category, "tags": ["tag"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    post
}

async fn create_comment(app: &Router, post_id: &str, content: &str) -> Value {
    let (status, comment) = send(
        app,
        "POST",
        &format!("/api/posts/{post_id}/comments"),
        Some(json!({ "content": content, "alias": "X" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    comment
}

#[tokio::test]
async fn test_health_check() {
    let app = app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_and_fetch_post() {
    let app = app();
    let post = create_post(&app, "Feeling stuck at work", "Work Stress").await;
    assert_eq!(post["category"], "Work Stress");
    assert_eq!(post["upvotes"], 0);
    assert!(post["alias"].as_str().unwrap().starts_with("User"));
    assert!(post.get("voters").is_none());

    let id = post["id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/api/posts/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["content"], "Feeling stuck at work");

    let (status, body) = send(&app, "GET", &format!("/api/posts/{}", Uuid::new_v4()), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn test_create_post_rejects_bad_input() {
    let app = app();
    let (status, _) = send(
        &app,
        "POST",
        "/api/posts",
        Some(json!({ "content": "x", "category": "Sports" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/posts",
        Some(json!({ "content": "  ", "category": "Faith" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Content is required");
}

#[tokio::test]
async fn test_list_posts_filters() {
    let app = app();
    create_post(&app, "Prayer helps", "Faith").await;
    create_post(&app, "My boss yells", "Work Stress").await;

    let (status, all) = send(&app, "GET", "/api/posts?category=All", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 2);

    let (_, faith) = send(&app, "GET", "/api/posts?category=Faith", None).await;
    assert_eq!(faith.as_array().unwrap().len(), 1);
    assert_eq!(faith[0]["content"], "Prayer helps");

    let (_, found) = send(&app, "GET", "/api/posts?search=BOSS", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "GET", "/api/posts?category=Sports", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_post_vote_walkthrough() {
    let app = app();
    let post = create_post(&app, "vote on me", "Other").await;
    let uri = format!("/api/posts/{}/vote", post["id"].as_str().unwrap());

    let steps = [
        ("A", "upvote", 1, 0),
        ("B", "downvote", 1, 1),
        ("A", "downvote", 0, 2),
        ("A", "downvote", 0, 1),
    ];
    for (user, kind, up, down) in steps {
        let (status, counts) = send(
            &app,
            "POST",
            &uri,
            Some(json!({ "type": kind, "userId": user })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(counts, json!({ "upvotes": up, "downvotes": down }));
    }
}

#[tokio::test]
async fn test_vote_requires_user_id() {
    let app = app();
    let post = create_post(&app, "vote on me", "Other").await;
    let uri = format!("/api/posts/{}/vote", post["id"].as_str().unwrap());

    let (status, body) = send(&app, "POST", &uri, Some(json!({ "type": "upvote" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "UserId is required");

    let (status, _) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "type": "sideways", "userId": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/posts/{}/vote", Uuid::new_v4()),
        Some(json!({ "type": "upvote", "userId": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_comment_token_lifecycle() {
    let app = app();
    let post = create_post(&app, "post", "Life Advice").await;
    let post_id = post["id"].as_str().unwrap();

    let created = create_comment(&app, post_id, "hello").await;
    let token = created["editToken"].as_str().unwrap().to_string();
    let comment_id = created["id"].as_str().unwrap().to_string();
    assert_eq!(token.len(), 32);
    assert_eq!(created["content"], "hello");

    let (status, comments) = send(&app, "GET", &format!("/api/posts/{post_id}/comments"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(comments.as_array().unwrap().len(), 1);
    assert!(comments[0].get("editToken").is_none());

    let edit_uri = format!("/api/posts/comments/{comment_id}");
    let (status, body) = send(
        &app,
        "PUT",
        &edit_uri,
        Some(json!({ "content": "hello2", "editToken": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Unauthorized: invalid edit token");

    let (_, comments) = send(&app, "GET", &format!("/api/posts/{post_id}/comments"), None).await;
    assert_eq!(comments[0]["content"], "hello");

    let (status, _) = send(&app, "PUT", &edit_uri, Some(json!({ "content": "hello2" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, edited) = send(
        &app,
        "PUT",
        &edit_uri,
        Some(json!({ "content": "hello2", "editToken": token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(edited["content"], "hello2");
    assert!(edited.get("editToken").is_none());
}

#[tokio::test]
async fn test_comment_vote_and_missing_post() {
    let app = app();
    let post = create_post(&app, "post", "Relationships").await;
    let created = create_comment(&app, post["id"].as_str().unwrap(), "c").await;
    let uri = format!("/api/posts/comments/{}/vote", created["id"].as_str().unwrap());

    let (status, counts) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "type": "upvote", "userId": "A" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(counts, json!({ "upvotes": 1, "downvotes": 0 }));

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/posts/{}/comments", Uuid::new_v4()),
        Some(json!({ "content": "orphan" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reports_and_stats() {
    let app = app_with(ServiceSettings {
        report_flag_threshold: 1,
        ..ServiceSettings::default()
    });
    let post = create_post(&app, "post", "Mental Health").await;
    let post_id = post["id"].as_str().unwrap();
    create_comment(&app, post_id, "c").await;

    let (status, report) = send(
        &app,
        "POST",
        "/api/reports",
        Some(json!({ "targetId": post_id, "targetType": "Post", "reason": "spam" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(report["status"], "pending");
    assert_eq!(report["targetType"], "Post");

    let (_, fetched) = send(&app, "GET", &format!("/api/posts/{post_id}"), None).await;
    assert_eq!(fetched["flagged"], true);

    let (status, _) = send(
        &app,
        "POST",
        "/api/reports",
        Some(json!({ "targetId": Uuid::new_v4(), "targetType": "Comment", "reason": "spam" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, stats) = send(&app, "GET", "/api/admin/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        stats["overview"],
        json!({ "totalPosts": 1, "totalComments": 1, "totalReports": 1, "pendingReports": 1 })
    );
    assert_eq!(stats["recentReports"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/posts")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
