use std::sync::Arc;

use axum::{
    extract::Path,
    http::{header::AUTHORIZATION, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use social_probe::probe::{extract_token, Backend, PostsShape, ProbeRequest, ResponseBody};
use social_probe::server::{build_app, NotificationChannel, RealtimeHub, ServerConfig, EVENT_NOTIFICATION_NEW};
use social_probe::Config;

const GOOD_TOKEN: &str = "test-token";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t == GOOD_TOKEN)
        .unwrap_or(false)
}

async fn notifications(headers: HeaderMap) -> Response {
    if authorized(&headers) {
        Json(json!([{"id": "n1", "type": "like"}])).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "No token provided"}))).into_response()
    }
}

async fn comments(Path(id): Path<String>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    (StatusCode::CREATED, Json(json!({"postId": id, "content": body["content"]}))).into_response()
}

async fn like(method: Method, Path(id): Path<String>, headers: HeaderMap) -> Response {
    Json(json!({"method": method.as_str(), "postId": id, "authorized": authorized(&headers)})).into_response()
}

async fn reports(method: Method, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    (StatusCode::CREATED, Json(json!({"method": method.as_str(), "authorized": authorized(&headers), "received": body})))
        .into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "alice" && body["password"] == "pw" {
        Json(json!({"data": {"token": GOOD_TOKEN}})).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({"error": "Invalid credentials"}))).into_response()
    }
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{}", addr)
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/notifications", get(notifications))
        .route("/notifications/all", get(|| async { Json(json!([{"id": 1}, {"id": 2}])) }))
        .route("/posts/{id}/comments", post(comments))
        .route("/posts/{id}/like", post(like))
        .route("/reports", post(reports))
        .route("/admin/posts/public", get(|| async { Json(json!({"data": [{"id": 1}]})) }))
        .route("/auth/login", post(login));
    spawn(app).await
}

fn backend(base_url: String) -> Backend {
    Backend::new(Config { base_url, ..Config::default() }).expect("backend")
}

#[tokio::test]
async fn notifications_with_token_succeed() {
    let backend = backend(spawn_backend().await);
    let outcome = backend.notifications(GOOD_TOKEN).await.expect("request");
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body, ResponseBody::Json(json!([{"id": "n1", "type": "like"}])));
}

#[tokio::test]
async fn auth_failure_is_reported_not_raised() {
    let backend = backend(spawn_backend().await);
    let outcome = backend.comment("p1", "hello", None).await.expect("request");
    assert_eq!(outcome.status, 401);
    assert!(outcome.is_auth_failure());
    assert_eq!(outcome.body, ResponseBody::Text("Unauthorized".to_string()));

    let created = backend.comment("p1", "hello", Some(GOOD_TOKEN)).await.expect("request");
    assert_eq!(created.status, 201);
    assert_eq!(created.body, ResponseBody::Json(json!({"postId": "p1", "content": "hello"})));
}

#[tokio::test]
async fn login_returns_token() {
    let backend = backend(spawn_backend().await);
    let outcome = backend.login("alice", "pw").await.expect("request");
    assert!(outcome.is_success());
    assert_eq!(outcome.body.as_json().and_then(extract_token), Some(GOOD_TOKEN));

    let rejected = backend.login("alice", "wrong").await.expect("request");
    assert_eq!(rejected.status, 401);
}

#[tokio::test]
async fn wrapped_posts_response_is_unexpected_shape() {
    let backend = backend(spawn_backend().await);
    let (outcome, shape) = backend.public_posts(None).await.expect("request");
    assert_eq!(outcome.status, 200);
    assert!(matches!(shape, PostsShape::Unexpected(_)));
}

#[tokio::test]
async fn generic_request_to_missing_route() {
    let backend = backend(spawn_backend().await);
    let outcome = backend.request(&ProbeRequest::get("/nope")).await.expect("request");
    assert_eq!(outcome.status, 404);
    assert!(!outcome.is_success());
}

#[tokio::test]
async fn connection_refused_is_an_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);

    let backend = backend(format!("http://{}", addr));
    assert!(backend.all_notifications().await.is_err());
}

#[tokio::test]
async fn emit_reaches_dev_server_channel() {
    let hub = Arc::new(RealtimeHub::new());
    let mut rx = hub.subscribe("42");
    let channel: Arc<dyn NotificationChannel> = hub.clone();
    let base = spawn(build_app(&ServerConfig::default(), Some(channel))).await;

    let payload = json!({"message": "someone liked your post"});
    let outcome = backend(base).emit_notification("42", &payload).await.expect("request");

    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body, ResponseBody::Json(json!({"success": true})));
    let event = rx.recv().await.expect("event");
    assert_eq!(event.event, EVENT_NOTIFICATION_NEW);
    assert_eq!(event.payload, payload);
}

#[tokio::test]
async fn like_posts_to_encoded_post_path() {
    let backend = backend(spawn_backend().await);
    let outcome = backend.like("a/b c", Some(GOOD_TOKEN)).await.expect("request");
    assert_eq!(outcome.status, 200);
    assert!(outcome.url.ends_with("/posts/a%2Fb%20c/like"));
    assert_eq!(
        outcome.body,
        ResponseBody::Json(json!({"method": "POST", "postId": "a/b c", "authorized": true}))
    );
}

#[tokio::test]
async fn encoded_post_id_stays_one_segment_for_comments() {
    let backend = backend(spawn_backend().await);
    let outcome = backend.comment("x/y", "hi", Some(GOOD_TOKEN)).await.expect("request");
    assert_eq!(outcome.status, 201);
    assert_eq!(outcome.body, ResponseBody::Json(json!({"postId": "x/y", "content": "hi"})));
}

#[tokio::test]
async fn report_sends_post_id_and_reason() {
    let backend = backend(spawn_backend().await);
    let outcome = backend.report("p7", "spam", None).await.expect("request");
    assert_eq!(outcome.status, 201);
    assert_eq!(
        outcome.body,
        ResponseBody::Json(json!({
            "method": "POST",
            "authorized": false,
            "received": {"postId": "p7", "reason": "spam"}
        }))
    );
}

#[tokio::test]
async fn all_notifications_counts_array_items() {
    let backend = backend(spawn_backend().await);
    let outcome = backend.all_notifications().await.expect("request");
    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.json_array_len(), Some(2));

    let (posts, _) = backend.public_posts(None).await.expect("request");
    assert_eq!(posts.json_array_len(), None);
}
