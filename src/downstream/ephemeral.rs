use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::{DownstreamError, DownstreamResponse, Transport, send_with_deadline};

/// Builds a client per call and drops it when the call ends, so no socket
/// outlives the request that opened it.
pub struct EphemeralTransport;

#[async_trait]
impl Transport for EphemeralTransport {
    async fn post_json(
        &self,
        url: &str,
        body: &Value,
        timeout: Duration,
    ) -> Result<DownstreamResponse, DownstreamError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(0)
            .build()
            .map_err(|e| DownstreamError::Transport {
                url: url.to_string(),
                source: Box::new(e),
            })?;

        // `client` is dropped on every path out of this function,
        // including cancellation of the outer future.
        send_with_deadline(&client, url, body, timeout).await
    }
}
