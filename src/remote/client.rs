//! Retrying HTTP client for the identity management platform.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use serde_json::Value;
use tracing::{debug, info};

use super::encoding::{JsonEncoder, PayloadEncoder};
use super::retry::{retry_with_backoff, RetryPolicy};
use crate::errors::{Error, Result};
use crate::observability::PAYLOAD_TARGET;

/// A single logical call against the management API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub query: Vec<(String, String)>,
    pub payload: Option<Value>,
    /// Overrides the client's default encoder for this call site
    pub encoder: Option<Arc<dyn PayloadEncoder>>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HeaderMap::new(),
            query: Vec::new(),
            payload: None,
            encoder: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn payload(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn encoder(mut self, encoder: Arc<dyn PayloadEncoder>) -> Self {
        self.encoder = Some(encoder);
        self
    }
}

/// Construction parameters for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    /// Base URL of the management API, e.g. `https://api.descope.com`
    pub base_url: String,

    /// Per-attempt timeout
    pub timeout: Duration,

    pub retry: RetryPolicy,

    /// Record request/response bodies at debug level
    pub log_payloads: bool,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.descope.com".to_string(),
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
            log_payloads: false,
        }
    }
}

/// HTTP client with bounded retry and pluggable payload encoding.
///
/// Holds no credentials. Authorization is a per-request header supplied by the
/// caller, so a client can be shared between invocations without sharing
/// secrets.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
    encoder: Arc<dyn PayloadEncoder>,
    log_payloads: bool,
}

impl ApiClient {
    /// Build a client with the JSON encoder as default.
    pub fn new(config: ApiClientConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            retry: config.retry,
            encoder: Arc::new(JsonEncoder),
            log_payloads: config.log_payloads,
        })
    }

    /// Replace the default payload encoder.
    pub fn with_encoder(mut self, encoder: Arc<dyn PayloadEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Issue the request, retrying per policy, and parse the JSON response.
    ///
    /// An empty 2xx body yields `Value::Null`.
    pub async fn call(&self, request: &ApiRequest) -> Result<Value> {
        let encoder = request.encoder.as_ref().unwrap_or(&self.encoder);
        let body = match &request.payload {
            Some(payload) => {
                if self.log_payloads {
                    debug!(
                        target: PAYLOAD_TARGET,
                        method = %request.method,
                        path = %request.path,
                        payload = %payload,
                        "Request payload"
                    );
                }
                Some((encoder.content_type(), encoder.encode(payload)?))
            }
            None => None,
        };

        let url = format!("{}{}", self.base_url, request.path);
        let operation = format!("{} {}", request.method, request.path);

        retry_with_backoff(
            &self.retry,
            &operation,
            |e| self.retry.should_retry(e),
            |attempt| self.attempt(request, &url, body.as_ref(), attempt),
        )
        .await
    }

    async fn attempt(
        &self,
        request: &ApiRequest,
        url: &str,
        body: Option<&(&'static str, Vec<u8>)>,
        attempt: u32,
    ) -> Result<Value> {
        let mut builder = self.http.request(request.method.clone(), url).headers(request.headers.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some((content_type, bytes)) = body {
            builder = builder.header(CONTENT_TYPE, *content_type).body(bytes.clone());
        }

        let response = builder.send().await.map_err(|e| {
            info!(method = %request.method, path = %request.path, attempt, error = %e, "Request failed to send");
            Error::transport(&request.method, &request.path, e.to_string())
        })?;

        let status = response.status();
        info!(
            method = %request.method,
            path = %request.path,
            attempt,
            status = status.as_u16(),
            "Management API response"
        );

        let text = response
            .text()
            .await
            .map_err(|e| Error::transport(&request.method, &request.path, e.to_string()))?;

        if self.log_payloads {
            debug!(
                target: PAYLOAD_TARGET,
                method = %request.method,
                path = %request.path,
                status = status.as_u16(),
                body = %text,
                "Response payload"
            );
        }

        if !status.is_success() {
            return Err(Error::remote_api(&request.method, &request.path, status.as_u16(), text));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text).map_err(|e| {
            Error::serialization(e, format!("Invalid JSON in response to {} {}", request.method, request.path))
        })
    }
}
