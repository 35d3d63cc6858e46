pub mod ephemeral;
pub mod mock;
pub mod pooled;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use ephemeral::EphemeralTransport;
use pooled::PooledTransport;

/// A fully read downstream response. HTTP error statuses land here too;
/// only network-level failures become [`DownstreamError`].
#[derive(Debug, Clone, PartialEq)]
pub struct DownstreamResponse {
    pub status: u16,
    pub body: String,
}

impl DownstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as JSON. Unparsable or empty bodies become `{}`.
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

/// Why a downstream call produced no response at all.
#[derive(Debug, thiserror::Error)]
pub enum DownstreamError {
    #[error("request to {url} timed out after {}ms", after.as_millis())]
    Timeout { url: String, after: Duration },
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl DownstreamError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, DownstreamError::Timeout { .. })
    }
}

/// Connection strategy, chosen once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum TransportMode {
    /// One shared keep-alive pool for every call (default).
    Pooled,
    /// A fresh client per call, torn down when the call ends.
    Ephemeral,
}

/// Outbound JSON POST with a hard deadline.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<DownstreamResponse, DownstreamError>;
}

/// Build the transport for a mode.
pub fn build(mode: TransportMode) -> Result<Arc<dyn Transport>> {
    Ok(match mode {
        TransportMode::Pooled => Arc::new(PooledTransport::new()?),
        TransportMode::Ephemeral => Arc::new(EphemeralTransport),
    })
}

/// Send `body` and read the whole response within `timeout`.
///
/// The body is always consumed here so no connection is handed back to
/// the pool mid-read. Hitting the deadline drops the in-flight future,
/// which cancels the request.
pub(crate) async fn send_with_deadline(
    client: &reqwest::Client,
    url: &str,
    body: &Value,
    timeout: Duration,
) -> Result<DownstreamResponse, DownstreamError> {
    let call = async {
        let resp = client.post(url).json(body).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok::<_, reqwest::Error>(DownstreamResponse { status, body })
    };

    match tokio::time::timeout(timeout, call).await {
        Ok(Ok(response)) => Ok(response),
        Ok(Err(e)) => Err(DownstreamError::Transport {
            url: url.to_string(),
            source: Box::new(e),
        }),
        Err(_) => Err(DownstreamError::Timeout {
            url: url.to_string(),
            after: timeout,
        }),
    }
}
