//! Project-wide constants.

use std::time::Duration;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Header carrying the caller's shared secret.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Header carrying the caller-supplied (or generated) request id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Environment variables consulted, in order, for the webhook secret.
pub const API_KEY_ENV_VARS: &[&str] = &["WEBHOOK_API_KEY", "WEBHOOK_KEY"];

pub const DEFAULT_PORT: u16 = 3000;

/// Largest inbound body accepted on any route.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

pub const RETRIEVE_TIMEOUT: Duration = Duration::from_secs(45);
pub const LESSON_TIMEOUT: Duration = Duration::from_secs(60);

/// Timeout for downstream calls that don't set their own.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Path appended to the business service base URL.
pub const LESSON_GENERATE_PATH: &str = "/v1/lessons/generate";

pub const DEFAULT_TOP_K: u64 = 6;
/// Larger `topK` requests are clamped to this before going downstream.
pub const MAX_TOP_K: u64 = 50;
pub const DEFAULT_NAME: &str = "Guest";
pub const DEFAULT_TENANT: &str = "default";
pub const DEFAULT_TITLE: &str = "Lesson";

/// How much of a downstream payload goes into a debug log line.
pub const PAYLOAD_SNIPPET_CHARS: usize = 500;

/// Truncate to at most `max` characters, never splitting a code point.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
