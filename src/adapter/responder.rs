//! Delivery of the response envelope to the orchestrator's pre-signed URL.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use tracing::info;

use super::envelope::CustomResourceResponse;
use crate::errors::{Error, Result};
use crate::remote::{retry_with_backoff, RetryPolicy};

/// Per-attempt bound on a response `PUT`.
pub const DEFAULT_DELIVERY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub struct ResponseSender {
    http: Client,
    retry: RetryPolicy,
    timeout: Duration,
}

impl ResponseSender {
    pub fn new(retry: RetryPolicy, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { http, retry, timeout })
    }

    /// Timeout applied to every delivery attempt.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// `PUT` the response with an empty content type, as pre-signed URLs
    /// are signed without one.
    pub async fn send(&self, url: &str, response: &CustomResourceResponse) -> Result<()> {
        let body = serde_json::to_vec(response)
            .map_err(|e| Error::serialization(e, "Failed to encode lifecycle response"))?;
        // Query strings of pre-signed URLs carry credentials.
        let target = redact_url(url);

        retry_with_backoff(
            &self.retry,
            "deliver_response",
            |e| self.retry.should_retry(e),
            |attempt| {
                let body = body.clone();
                let target = target.as_str();
                async move {
                    let sent = self
                        .http
                        .put(url)
                        .header(CONTENT_TYPE, "")
                        .timeout(self.timeout)
                        .body(body)
                        .send()
                        .await
                        .map_err(|e| Error::transport(&Method::PUT, target, e.without_url().to_string()))?;

                    let status = sent.status();
                    info!(target_url = %target, attempt, status = status.as_u16(), "Response delivered");
                    if status.is_success() {
                        Ok(())
                    } else {
                        let text = sent.text().await.unwrap_or_default();
                        Err(Error::remote_api(&Method::PUT, target, status.as_u16(), text))
                    }
                }
            },
        )
        .await
    }
}

impl Default for ResponseSender {
    fn default() -> Self {
        Self {
            http: Client::new(),
            retry: RetryPolicy::response_delivery(),
            timeout: DEFAULT_DELIVERY_TIMEOUT,
        }
    }
}

/// Host and path of a URL, without its query string.
fn redact_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => format!("{}{}", parsed.host_str().unwrap_or_default(), parsed.path()),
        Err(_) => "<invalid url>".to_string(),
    }
}
