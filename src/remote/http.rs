//! HTTP client for the `compute_pi` service
//!
//! Endpoint: `GET {base}/compute_pi?startIndex=S&endIndex=E`, answered with a
//! plain-text decimal.

use crate::arithmetic::{parse_decimal, WorkingPrecision};
use crate::errors::{PiError, Result};
use crate::partition::SeriesRange;
use crate::remote::RemoteSumClient;
use async_trait::async_trait;
use bigdecimal::BigDecimal;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Default service endpoint
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Default request path
pub const DEFAULT_PATH: &str = "/compute_pi";

/// Default request timeout (30 seconds)
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Partial-sum client backed by the remote service
#[derive(Debug, Clone)]
pub struct HttpSumClient {
    client: Client,
    base_url: String,
    path: String,
    ctx: WorkingPrecision,
}

impl HttpSumClient {
    /// Create client against the default endpoint
    pub fn new(ctx: WorkingPrecision) -> Result<Self> {
        Self::with_config(DEFAULT_BASE_URL, DEFAULT_PATH, DEFAULT_TIMEOUT, ctx)
    }

    /// Create client with custom endpoint and timeout
    pub fn with_config(
        base_url: &str,
        path: &str,
        timeout: Duration,
        ctx: WorkingPrecision,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(PiError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            path: path.to_string(),
            ctx,
        })
    }

    /// Full request URL without query
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.path)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl RemoteSumClient for HttpSumClient {
    async fn partial_sum(&self, range: SeriesRange) -> Result<BigDecimal> {
        let transport = |reason: String| PiError::Transport {
            start: range.start(),
            end: range.end(),
            reason,
        };

        let response = self
            .client
            .get(self.endpoint())
            .header(ACCEPT, "text/plain")
            .query(&[("startIndex", range.start()), ("endIndex", range.end())])
            .send()
            .await
            .map_err(|e| transport(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(transport(format!("HTTP {}: {}", status, error_text)));
        }

        let body = response
            .text()
            .await
            .map_err(|e| transport(format!("Failed to read body: {}", e)))?;

        debug!(range = %range, body = %body.trim(), "partial sum received");

        let value = parse_decimal(&body).ok_or_else(|| PiError::MalformedResponse {
            start: range.start(),
            end: range.end(),
            body: body.clone(),
        })?;

        Ok(self.ctx.round(&value))
    }

    fn describe(&self) -> String {
        self.endpoint()
    }
}
