//! One method per action. Each decides for itself whether a downstream
//! failure is fatal (502) or falls back to a stub.

use std::time::Duration;

use anyhow::Result;
use serde_json::{Value, json};

use super::{Dispatcher, Reply};
use crate::consts::{
    DEFAULT_TIMEOUT, LESSON_GENERATE_PATH, LESSON_TIMEOUT, PAYLOAD_SNIPPET_CHARS, RETRIEVE_TIMEOUT,
    truncate_chars,
};
use crate::downstream::DownstreamError;
use crate::lesson::{Lesson, bullet_count};
use crate::markdown::{markdown_data_url, render_markdown};
use crate::request::{DispatchRequest, is_truthy, stringify};
use crate::stubs::{self, SOURCE_STUB};

use super::elicit;

const SOURCE_BUSINESS: &str = "business";

/// Why a downstream call produced no usable payload.
enum CallFailure {
    Status(u16),
    Unreachable(DownstreamError),
}

impl Dispatcher {
    /// POST `payload` and return the parsed body of a 2xx response.
    async fn call(
        &self,
        service: &'static str,
        url: &str,
        payload: &Value,
        timeout: Duration,
    ) -> Result<Value, CallFailure> {
        let response = match self.transport.post_json(url, payload, timeout).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(service, url, timed_out = e.is_timeout(), error = %e, "downstream unreachable");
                return Err(CallFailure::Unreachable(e));
            }
        };

        if !response.is_success() {
            tracing::warn!(
                service,
                url,
                status = response.status,
                body = %truncate_chars(&response.body, PAYLOAD_SNIPPET_CHARS),
                "downstream error status"
            );
            return Err(CallFailure::Status(response.status));
        }

        if self.settings.debug_payloads {
            tracing::info!(
                service,
                snippet = %truncate_chars(&response.body, PAYLOAD_SNIPPET_CHARS),
                "llm payload snippet"
            );
        }

        Ok(response.json())
    }

    pub(super) fn ping(&self, request: &DispatchRequest, request_id: &str) -> Reply {
        Reply::ok(json!({
            "ok": true,
            "reply": format!("Hi {}, I received: \"{}\".", request.name, request.question),
            "port": self.settings.port,
            "requestId": request_id,
        }))
    }

    pub(super) async fn retrieve(&self, request: &DispatchRequest) -> Reply {
        let Some(url) = self.settings.retrieval_url.as_deref() else {
            return Reply::fail(400, "RETRIEVAL_URL not configured");
        };
        if request.question.trim().is_empty() {
            return Reply::fail(400, "Missing `question`");
        }

        let payload = json!({
            "query": request.question,
            "topK": request.top_k,
            "tenantId": request.tenant_id,
        });
        let Ok(data) = self.call("retrieval", url, &payload, RETRIEVE_TIMEOUT).await else {
            return Reply::fail(502, "retrieval_failed");
        };

        let hit_count = data.get("hits").and_then(Value::as_array).map_or(0, Vec::len);
        let reply = data
            .get("reply")
            .filter(|v| is_truthy(v))
            .map(stringify)
            .unwrap_or_else(|| format!("Found {hit_count} passages."));

        Reply::ok(json!({
            "ok": true,
            "reply": reply,
            "hitCount": hit_count,
            "tenantId": request.tenant_id,
        }))
    }

    pub(super) async fn generate_lesson(&self, request: &DispatchRequest) -> Result<Reply> {
        if let Some(base) = self.settings.business_url.as_deref() {
            let url = format!("{}{}", base.trim_end_matches('/'), LESSON_GENERATE_PATH);
            let payload = json!({"question": request.question, "tenantId": request.tenant_id});

            match self.call("business", &url, &payload, LESSON_TIMEOUT).await {
                Ok(data) => {
                    let lesson = data
                        .get("lesson")
                        .filter(|v| is_truthy(v))
                        .cloned()
                        .unwrap_or_else(|| json!({}));
                    return Ok(lesson_reply(lesson, SOURCE_BUSINESS));
                }
                Err(_) => tracing::info!("business service unavailable, serving stub lesson"),
            }
        }

        let lesson = serde_json::to_value(stubs::lesson(&request.question))?;
        Ok(lesson_reply(lesson, SOURCE_STUB))
    }

    // The prompt service is never consulted here, even when configured.
    pub(super) fn generate_quiz(&self, request: &DispatchRequest) -> Result<Reply> {
        if request.question.trim().is_empty() {
            return Ok(Reply::fail(400, "Missing `question`"));
        }

        let quiz = stubs::quiz();
        Ok(Reply::ok(json!({
            "ok": true,
            "reply": "Your prompt lesson and quiz are ready.",
            "lessonTitle": stubs::LESSON_TITLE,
            "mcqCount": quiz.mcq.len(),
            "tfCount": quiz.tf.len(),
            "openCount": quiz.open.len(),
            "promptLesson": serde_json::to_value(stubs::prompt_lesson())?,
            "quiz": serde_json::to_value(&quiz)?,
            "source": SOURCE_STUB,
        })))
    }

    pub(super) fn export_lesson(&self, request: &DispatchRequest) -> Reply {
        let lesson = Lesson::from_value_lossy(&request.lesson);
        let markdown = render_markdown(&request.title, &lesson);
        Reply::ok(json!({
            "ok": true,
            "reply": "Export ready.",
            "url": markdown_data_url(&markdown),
        }))
    }

    pub(super) async fn llm_elicit(&self, request: &DispatchRequest) -> Reply {
        let Some(url) = self.settings.prompt_url.as_deref() else {
            let raw = json!({"source": SOURCE_STUB});
            return Reply::ok(json!({
                "ok": true,
                "summary": stubs::elicit_summary(&request.question),
                "needs_clarify": false,
                "followup_question": "",
                "raw": raw,
                "data": {"raw": raw},
            }));
        };

        let payload = json!({
            "action": "llm_elicit",
            "question": request.question,
            "tenantId": request.tenant_id,
        });
        let data = match self.call("prompt", url, &payload, DEFAULT_TIMEOUT).await {
            Ok(data) => data,
            Err(CallFailure::Status(_)) => return Reply::fail(502, "prompt_service_failed"),
            Err(CallFailure::Unreachable(_)) => return Reply::fail(502, "llm_elicit_failed"),
        };

        let summary = match elicit::summarize(&data) {
            Some(summary) => {
                tracing::debug!(via = ?summary.source, "elicitation summary");
                summary.text
            }
            None => String::new(),
        };
        let needs_clarify = data.get("needs_clarify").is_some_and(is_truthy);
        let followup_question = data
            .get("followup_question")
            .filter(|v| !v.is_null())
            .map(stringify)
            .unwrap_or_default();

        Reply::ok(json!({
            "ok": true,
            "summary": summary,
            "needs_clarify": needs_clarify,
            "followup_question": followup_question,
            "raw": data,
            "data": {"raw": data},
        }))
    }

    pub(super) fn invoke_component(&self, request: &DispatchRequest) -> Reply {
        let outcome = stubs::invoke_component(&request.component, &request.question);
        Reply::ok(json!({
            "ok": true,
            "reply": outcome.reply,
            "component": request.component,
            "needs_clarify": outcome.needs_clarify,
            "followup_question": outcome.followup_question,
            "raw": outcome.raw,
            "data": {"raw": outcome.raw},
        }))
    }
}

fn lesson_reply(lesson: Value, source: &str) -> Reply {
    let title = lesson
        .get("title")
        .filter(|v| is_truthy(v))
        .map(stringify)
        .unwrap_or_default();
    Reply::ok(json!({
        "ok": true,
        "reply": "Lesson ready.",
        "lessonTitle": title,
        "bulletCount": bullet_count(&lesson),
        "lesson": lesson,
        "source": source,
    }))
}
