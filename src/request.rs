//! Inbound envelope coercion.
//!
//! Callers send loosely-typed JSON. Every field is forced into a plain
//! primitive here, once, so handlers never branch on the shape of the
//! input. Nothing in this module fails.

use serde_json::Value;

use crate::consts::{DEFAULT_NAME, DEFAULT_TENANT, DEFAULT_TITLE, DEFAULT_TOP_K, MAX_TOP_K};

/// A `/webhook` request after coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    /// Lower-cased; `"ping"` when absent.
    pub action: String,
    pub question: String,
    pub name: String,
    pub tenant_id: String,
    /// At least 1, at most [`MAX_TOP_K`].
    pub top_k: u64,
    pub component: String,
    pub title: String,
    /// Parsed lesson payload. Always an object: `{}` when absent,
    /// unparsable, or not an object.
    pub lesson: Value,
}

impl Default for DispatchRequest {
    fn default() -> Self {
        Self::from_value(&Value::Null)
    }
}

impl DispatchRequest {
    /// Coerce any JSON value. Non-object bodies behave like `{}`.
    pub fn from_value(body: &Value) -> Self {
        let action = present(body, "action")
            .map(stringify)
            .unwrap_or_else(|| "ping".to_string())
            .to_lowercase();

        let question = present(body, "question")
            .or_else(|| present(body, "message"))
            .map(stringify)
            .unwrap_or_default();

        let name = truthy_field(body, "name")
            .or_else(|| truthy_field(body, "first_name"))
            .map(stringify)
            .unwrap_or_else(|| DEFAULT_NAME.to_string());

        let tenant_id = truthy_field(body, "tenantId")
            .map(stringify)
            .unwrap_or_else(|| DEFAULT_TENANT.to_string());

        let top_k = present(body, "topK")
            .and_then(as_number)
            .filter(|n| n.is_finite() && *n >= 1.0)
            .map(|n| (n.floor() as u64).min(MAX_TOP_K))
            .unwrap_or(DEFAULT_TOP_K);

        let component = present(body, "component")
            .map(stringify)
            .unwrap_or_default();

        let (title, lesson) = export_fields(body);

        Self {
            action,
            question,
            name,
            tenant_id,
            top_k,
            component,
            title,
            lesson,
        }
    }
}

/// `title` and `lesson` as the export paths read them. Shared with the
/// unauthenticated file-export route.
pub fn export_fields(body: &Value) -> (String, Value) {
    let title = truthy_field(body, "title")
        .map(stringify)
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let lesson = match truthy_field(body, "lesson") {
        Some(Value::String(text)) => parse_object_lossy(text),
        Some(object @ Value::Object(_)) => object.clone(),
        _ => empty_object(),
    };

    (title, lesson)
}

/// Parse JSON text that should hold an object. Unparsable text and
/// non-object JSON (`null`, arrays, scalars) both become `{}`.
pub fn parse_object_lossy(text: &str) -> Value {
    match serde_json::from_str(text) {
        Ok(value @ Value::Object(_)) => value,
        _ => empty_object(),
    }
}

/// The value's plain-text form: strings as-is, everything else as JSON.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Whether a JSON value counts as "set" for `a || b` style defaults.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Field that is present and not null.
fn present<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|v| !v.is_null())
}

fn truthy_field<'a>(body: &'a Value, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|v| is_truthy(v))
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
