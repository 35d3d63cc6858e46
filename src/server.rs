//! Inbound HTTP surface.
//!
//! `/webhook` hands everything to the [`Dispatcher`]; the other routes are
//! small enough to live here. Every request passes through
//! [`request_context`], which assigns the request id and opens the span
//! the rest of the request logs under.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, Extension, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::Instrument;
use uuid::Uuid;

use crate::consts::{API_KEY_HEADER, MAX_BODY_BYTES, REQUEST_ID_HEADER};
use crate::dispatch::{Dispatcher, Reply};
use crate::lesson::Lesson;
use crate::markdown::{export_file_name, render_markdown};
use crate::request::{export_fields, parse_object_lossy};

const MAX_REQUEST_ID_LEN: usize = 128;

#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    /// Set once the listener is bound, cleared when shutdown begins.
    pub ready: Arc<AtomicBool>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            ready: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// The request id assigned by [`request_context`].
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/export_lesson_file", post(export_lesson_file))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(middleware::from_fn(request_context))
        .with_state(state)
}

/// Serve until `shutdown` resolves, then drain in-flight requests.
///
/// Readiness is raised once serving starts and dropped as soon as the
/// shutdown future fires, before the drain.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state.clone());
    let flag = state.clone();
    state.set_ready(true);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.await;
            flag.set_ready(false);
            tracing::info!("shutdown requested, draining in-flight requests");
        })
        .await
        .context("HTTP server failed")
}

async fn request_context(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %id
    );
    req.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(req).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Anything that is not a JSON object is treated as `{}`.
fn json_body(body: &Bytes) -> Value {
    std::str::from_utf8(body)
        .map(parse_object_lossy)
        .unwrap_or_else(|_| json!({}))
}

async fn webhook(
    State(state): State<AppState>,
    Extension(RequestId(request_id)): Extension<RequestId>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let payload = json_body(&body);
    let api_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());
    let reply = state.dispatcher.dispatch(api_key, &payload, &request_id).await;
    reply.into_response()
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

async fn health() -> &'static str {
    "ok"
}

async fn ready(State(state): State<AppState>) -> Response {
    let settings = state.dispatcher.settings();
    let ready = state.is_ready();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = json!({
        "ready": ready,
        "retrieval": settings.retrieval_url.is_some(),
        "business": settings.business_url.is_some(),
        "prompt": settings.prompt_url.is_some(),
    });
    (status, Json(body)).into_response()
}

async fn export_lesson_file(body: Bytes) -> Response {
    let payload = json_body(&body);
    let (title, lesson) = export_fields(&payload);
    let markdown = render_markdown(&title, &Lesson::from_value_lossy(&lesson));
    let disposition = format!("attachment; filename=\"{}\"", export_file_name(&title));

    (
        [
            (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        markdown,
    )
        .into_response()
}
