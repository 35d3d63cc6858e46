use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

use super::{DownstreamError, DownstreamResponse, Transport, send_with_deadline};

/// How long an idle pooled connection is kept around.
const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);

/// Shares one keep-alive pool across every call. `reqwest::Client` is
/// internally reference counted, so concurrent calls are fine.
pub struct PooledTransport {
    client: reqwest::Client,
}

impl PooledTransport {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(POOL_IDLE_TIMEOUT)
            .build()
            .context("failed to build pooled HTTP client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for PooledTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<DownstreamResponse, DownstreamError> {
        send_with_deadline(&self.client, url, body, timeout).await
    }
}
