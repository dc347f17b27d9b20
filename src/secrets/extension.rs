//! Local parameters-and-secrets side-channel resolver.
//!
//! The host runs a loopback HTTP extension that decrypts parameters on demand.
//! A lookup is a single `GET` against
//! `/systemsmanager/parameters/get?name=<name>&withDecryption=true`, authorised
//! with the invocation's ambient session token, and the plaintext is read from
//! `Parameter.Value` in the JSON answer.
//!
//! # Configuration
//!
//! - `PARAMETERS_SECRETS_EXTENSION_HTTP_PORT`: extension port (default 2773)
//! - `AWS_SESSION_TOKEN`: value sent in `X-Aws-Parameters-Secrets-Token`

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::client::SecretResolver;
use super::error::{Result, SecretsError};
use super::types::SecretString;

/// Default port of the side-channel extension.
pub const DEFAULT_EXTENSION_PORT: u16 = 2773;

/// Header carrying the session token.
pub const SESSION_TOKEN_HEADER: &str = "X-Aws-Parameters-Secrets-Token";

const PARAMETER_PATH: &str = "/systemsmanager/parameters/get";

/// Side-channel connection settings.
#[derive(Debug, Clone)]
pub struct ExtensionConfig {
    /// Base URL of the extension, e.g. `http://localhost:2773`
    pub endpoint: String,

    /// Ambient session token of the current invocation
    pub session_token: SecretString,

    /// Per-lookup timeout
    pub timeout: Duration,
}

impl ExtensionConfig {
    /// Settings for an extension listening on the given loopback port.
    pub fn for_port(port: u16, session_token: SecretString) -> Self {
        Self {
            endpoint: format!("http://localhost:{}", port),
            session_token,
            timeout: Duration::from_secs(5),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ParameterResponse {
    #[serde(rename = "Parameter")]
    parameter: Option<Parameter>,
}

#[derive(Debug, Deserialize)]
struct Parameter {
    #[serde(rename = "Value")]
    value: Option<SecretString>,
}

/// Resolver backed by the local side-channel extension.
#[derive(Debug, Clone)]
pub struct ExtensionSecretResolver {
    client: reqwest::Client,
    config: ExtensionConfig,
}

impl ExtensionSecretResolver {
    /// Create a resolver for the given extension.
    pub fn new(config: ExtensionConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SecretsError::unreachable("<client>", e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self) -> String {
        format!("{}{}", self.config.endpoint.trim_end_matches('/'), PARAMETER_PATH)
    }
}

#[async_trait]
impl SecretResolver for ExtensionSecretResolver {
    async fn resolve(&self, name: &str) -> Result<SecretString> {
        if name.trim().is_empty() {
            return Err(SecretsError::invalid_name(name, "secret name cannot be empty"));
        }

        debug!(secret_name = %name, "Resolving secret from side-channel");

        let response = self
            .client
            .get(self.url())
            .query(&[("name", name), ("withDecryption", "true")])
            .header(SESSION_TOKEN_HEADER, self.config.session_token.expose_secret())
            .send()
            .await
            .map_err(|e| SecretsError::unreachable(name, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SecretsError::status(name, status.as_u16()));
        }

        // Read as text first so a malformed body maps to MissingValue rather than a transport error.
        let body = response.text().await.map_err(|e| SecretsError::unreachable(name, e.to_string()))?;
        let parsed: ParameterResponse =
            serde_json::from_str(&body).map_err(|_| SecretsError::missing_value(name))?;

        let value = parsed
            .parameter
            .and_then(|p| p.value)
            .ok_or_else(|| SecretsError::missing_value(name))?;

        debug!(secret_name = %name, "Secret resolved");
        Ok(value)
    }
}
