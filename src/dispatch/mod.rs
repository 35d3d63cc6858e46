pub mod action;
pub mod elicit;
mod handlers;

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::{Value, json};

use crate::config::{KeySource, Settings};
use crate::downstream::Transport;
use crate::normalize::mirror_raw;
use crate::request::DispatchRequest;

pub use action::Action;

/// Status plus JSON body, ready to send.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub status: u16,
    pub body: Value,
}

impl Reply {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    /// `{ok: false, reply}` with the given status.
    pub fn fail(status: u16, reply: impl Into<String>) -> Self {
        Self {
            status,
            body: json!({"ok": false, "reply": reply.into()}),
        }
    }
}

/// Authenticates, coerces, routes and normalizes `/webhook` calls.
///
/// Holds only read-only state, so one instance serves every request
/// concurrently.
pub struct Dispatcher {
    settings: Settings,
    keys: KeySource,
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(settings: Settings, keys: KeySource, transport: Arc<dyn Transport>) -> Self {
        Self {
            settings,
            keys,
            transport,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle one `/webhook` call. Never fails: every outcome, including a
    /// handler error or panic, becomes a [`Reply`].
    pub async fn dispatch(&self, api_key: Option<&str>, body: &Value, request_id: &str) -> Reply {
        if !self.keys.authorize(api_key) {
            tracing::warn!(key_supplied = api_key.is_some(), "unauthorized webhook call");
            return Reply::fail(401, "unauthorized");
        }

        let request = DispatchRequest::from_value(body);
        tracing::info!(
            action = %request.action,
            name = %request.name,
            tenant = %request.tenant_id,
            "webhook"
        );

        let outcome = AssertUnwindSafe(self.route(&request, request_id))
            .catch_unwind()
            .await;

        let mut reply = match outcome {
            Ok(Ok(reply)) => reply,
            Ok(Err(e)) => {
                let detail = format!("{e:#}");
                tracing::error!(action = %request.action, error = %detail, "handler failed");
                Reply::fail(500, "internal_error")
            }
            Err(_) => {
                tracing::error!(action = %request.action, "handler panicked");
                Reply::fail(500, "internal_error")
            }
        };

        mirror_raw(&mut reply.body);
        reply
    }

    async fn route(&self, request: &DispatchRequest, request_id: &str) -> anyhow::Result<Reply> {
        let Some(action) = Action::parse(&request.action) else {
            return Ok(Reply::fail(400, format!("Unknown action: {}", request.action)));
        };

        match action {
            Action::Ping => Ok(self.ping(request, request_id)),
            Action::Retrieve => Ok(self.retrieve(request).await),
            Action::GenerateLesson => self.generate_lesson(request).await,
            Action::GenerateQuiz => self.generate_quiz(request),
            Action::ExportLesson => Ok(self.export_lesson(request)),
            Action::LlmElicit => Ok(self.llm_elicit(request).await),
            Action::InvokeComponent => Ok(self.invoke_component(request)),
        }
    }
}
