use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::Response;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use courier::config::{KeySource, Settings};
use courier::dispatch::Dispatcher;
use courier::downstream::mock::MockTransport;
use courier::server::{AppState, build_router};

const KEY: &str = "router-key";

fn state(settings: Settings) -> AppState {
    let dispatcher = Dispatcher::new(
        settings,
        KeySource::Fixed(KEY.to_string()),
        Arc::new(MockTransport::new(vec![])),
    );
    AppState::new(dispatcher)
}

fn app() -> Router {
    build_router(state(Settings::default()))
}

fn post(uri: &str, key: Option<&str>, body: impl Into<Body>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(key) = key {
        builder = builder.header("x-api-key", key);
    }
    builder.body(body.into()).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_text(response).await).unwrap()
}

// ── health / ready ──────────────────────────────────────────────

#[tokio::test]
async fn health_is_ok_without_auth() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn ready_is_unavailable_until_flagged() {
    let state = state(Settings::new(
        3000,
        Some("http://r".to_string()),
        None,
        Some(" ".to_string()),
    ));
    let response = build_router(state.clone()).oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["ready"], false);

    state.set_ready(true);
    let response = build_router(state.clone()).oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({"ready": true, "retrieval": true, "business": false, "prompt": false})
    );
}

// ── webhook ─────────────────────────────────────────────────────

#[tokio::test]
async fn webhook_without_key_is_401() {
    let response = app()
        .oneshot(post("/webhook", None, r#"{"action":"ping"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        body_json(response).await,
        json!({"ok": false, "reply": "unauthorized"})
    );
}

#[tokio::test]
async fn webhook_ping_round_trip() {
    let response = app()
        .oneshot(post(
            "/webhook",
            Some(KEY),
            r#"{"action":"ping","name":"Ari","question":"hi"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    let body = body_json(response).await;
    assert_eq!(body["reply"], "Hi Ari, I received: \"hi\".");
}

#[tokio::test]
async fn request_id_is_echoed() {
    let mut request = post("/webhook", Some(KEY), "{}");
    request
        .headers_mut()
        .insert("x-request-id", "abc-123".parse().unwrap());

    let response = app().oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
    assert_eq!(body_json(response).await["requestId"], "abc-123");
}

#[tokio::test]
async fn bad_json_is_treated_as_empty_body() {
    let response = app()
        .oneshot(post("/webhook", Some(KEY), "{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["reply"],
        "Hi Guest, I received: \"\"."
    );
}

#[tokio::test]
async fn non_object_json_is_treated_as_empty_body() {
    let response = app()
        .oneshot(post("/webhook", Some(KEY), r#"["action","retrieve"]"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_action_is_400() {
    let response = app()
        .oneshot(post("/webhook", Some(KEY), r#"{"action":"unknown_thing"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["reply"],
        "Unknown action: unknown_thing"
    );
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let big = format!(r#"{{"question":"{}"}}"#, "x".repeat(2 * 1024 * 1024));
    let response = app()
        .oneshot(post("/webhook", Some(KEY), big))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn export_lesson_data_url_decodes_to_markdown() {
    let response = app()
        .oneshot(post(
            "/webhook",
            Some(KEY),
            json!({
                "action": "export_lesson",
                "title": "Rent",
                "lesson": {"keyTakeaways": ["Anchor high"]}
            })
            .to_string(),
        ))
        .await
        .unwrap();

    let body = body_json(response).await;
    let url = body["url"].as_str().unwrap();
    let encoded = url.strip_prefix("data:text/markdown;base64,").unwrap();
    let markdown = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
    assert!(markdown.starts_with("# Rent\n"));
    assert!(markdown.contains("## Key Takeaways"));
    assert!(markdown.contains("- Anchor high"));
}

// ── export_lesson_file ──────────────────────────────────────────

#[tokio::test]
async fn export_file_needs_no_key_and_sets_headers() {
    let response = app()
        .oneshot(post(
            "/export_lesson_file",
            None,
            json!({"title": "Pricing: 101 / Basics", "lesson": {"content": "Body text"}}).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/markdown; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Pricing_101_Basics.md\""
    );
    let markdown = body_text(response).await;
    assert!(markdown.starts_with("# Pricing: 101 / Basics\n"));
    assert!(markdown.contains("Body text"));
}

#[tokio::test]
async fn export_file_with_garbage_body_still_renders() {
    let response = app()
        .oneshot(post("/export_lesson_file", None, "garbage"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Lesson.md\""
    );
    assert_eq!(body_text(response).await, "# Lesson\n\n## Lesson\n\n\n");
}
