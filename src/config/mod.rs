//! Process-wide configuration.
//!
//! Downstream URLs and transport choice are fixed at startup. The webhook
//! secret is not: [`KeySource::resolve`] reads it again on every request,
//! so rotating `WEBHOOK_API_KEY` takes effect without a restart.

use sha2::{Digest, Sha256};

use crate::consts::{API_KEY_ENV_VARS, DEFAULT_PORT};
use crate::downstream::TransportMode;

/// Startup configuration shared read-only by every request.
#[derive(Debug, Clone)]
pub struct Settings {
    pub port: u16,
    pub retrieval_url: Option<String>,
    pub business_url: Option<String>,
    pub prompt_url: Option<String>,
    pub transport: TransportMode,
    /// Log a snippet of every downstream payload.
    pub debug_payloads: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            retrieval_url: None,
            business_url: None,
            prompt_url: None,
            transport: TransportMode::Pooled,
            debug_payloads: false,
        }
    }
}

impl Settings {
    /// Build settings from raw option values. Blank URLs count as unset.
    pub fn new(
        port: u16,
        retrieval_url: Option<String>,
        business_url: Option<String>,
        prompt_url: Option<String>,
    ) -> Self {
        Self {
            port,
            retrieval_url: non_blank(retrieval_url),
            business_url: non_blank(business_url),
            prompt_url: non_blank(prompt_url),
            ..Self::default()
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Where the webhook secret comes from.
#[derive(Debug, Clone)]
pub enum KeySource {
    /// Environment (`WEBHOOK_API_KEY`, then `WEBHOOK_KEY`), read per call.
    /// `dev_default` applies only when neither variable is set.
    Env { dev_default: Option<String> },
    /// A fixed key. Used by tests and embedders.
    Fixed(String),
}

impl KeySource {
    /// Resolve the current secret. Empty means "nothing configured".
    pub fn resolve(&self) -> String {
        self.resolve_from(env_lookup)
    }

    /// Exact comparison against the current secret. An empty secret
    /// rejects every caller.
    pub fn authorize(&self, supplied: Option<&str>) -> bool {
        self.authorize_from(supplied, env_lookup)
    }

    fn resolve_from(&self, lookup: impl Fn(&str) -> Option<String>) -> String {
        match self {
            KeySource::Fixed(key) => key.clone(),
            KeySource::Env { dev_default } => resolve_with(lookup, dev_default.as_deref()),
        }
    }

    fn authorize_from(
        &self,
        supplied: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> bool {
        let expected = self.resolve_from(lookup);
        !expected.is_empty() && supplied == Some(expected.as_str())
    }
}

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

fn resolve_with(lookup: impl Fn(&str) -> Option<String>, dev_default: Option<&str>) -> String {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.is_empty())
        .or_else(|| dev_default.map(str::to_string))
        .unwrap_or_default()
}

/// A loggable description of a secret: length and a short SHA-256 prefix.
pub fn key_fingerprint(key: &str) -> String {
    if key.is_empty() {
        return "not set".to_string();
    }
    let digest = format!("{:x}", Sha256::digest(key.as_bytes()));
    format!("len={} sha256={}", key.len(), &digest[..12])
}
