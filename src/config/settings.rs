//! # Configuration Settings
//!
//! Defines the configuration structure for the identity provisioner.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::controller::{ControllerConfig, ResourceKind};
use crate::errors::{Error, Result};
use crate::remote::RetryPolicy;
use crate::secrets::{SecretString, DEFAULT_EXTENSION_PORT};

pub const DEFAULT_BASE_URL: &str = "https://api.descope.com";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    #[validate(nested)]
    pub management: ManagementConfig,

    #[validate(nested)]
    pub retry: RetrySettings,

    #[validate(nested)]
    pub secrets: SecretsConfig,

    #[validate(nested)]
    pub observability: ObservabilityConfig,

    /// Kind used when a resource type does not name one
    pub default_resource_kind: Option<ResourceKind>,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    fn validate_custom(&self) -> Result<()> {
        let base_url = url::Url::parse(&self.management.base_url)
            .map_err(|e| Error::config(format!("Invalid management base URL: {}", e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(Error::config("Management base URL must use http or https"));
        }

        if self.retry.initial_delay_ms > self.retry.max_delay_ms {
            return Err(Error::config("Retry initial delay cannot exceed the maximum delay"));
        }

        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.policy()
    }

    pub fn controller_config(&self) -> ControllerConfig {
        ControllerConfig {
            project_id: self.management.project_id.clone(),
            secret_name: self.management.secret_name.clone(),
            base_url: self.management.base_url.clone(),
            retry: self.retry_policy(),
            request_timeout: self.management.request_timeout(),
            log_payloads: self.observability.log_payloads,
        }
    }
}

/// Remote management API configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ManagementConfig {
    /// Project id used when a resource does not declare one
    pub project_id: Option<String>,

    /// Secret reference used when a resource does not declare one
    pub secret_name: Option<String>,

    #[validate(length(min = 1, message = "Base URL cannot be empty"))]
    pub base_url: String,

    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub request_timeout_seconds: u64,
}

impl Default for ManagementConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            secret_name: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_seconds: 10,
        }
    }
}

impl ManagementConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Retry settings for management API calls
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RetrySettings {
    #[validate(range(min = 1, max = 10, message = "Max attempts must be between 1 and 10"))]
    pub max_attempts: u32,

    pub initial_delay_ms: u64,

    #[validate(range(max = 60000, message = "Max delay cannot exceed 60000 ms"))]
    pub max_delay_ms: u64,

    /// Retry every failure status instead of only 408/429/5xx
    pub retry_all_statuses: bool,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self { max_attempts: 3, initial_delay_ms: 200, max_delay_ms: 2000, retry_all_statuses: false }
    }
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        let policy = RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            max_delay: Duration::from_millis(self.max_delay_ms),
            ..RetryPolicy::default()
        };
        if self.retry_all_statuses {
            policy.retry_all()
        } else {
            policy
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SecretSource {
    /// Local parameters-and-secrets extension
    #[default]
    Extension,
    /// `PROVISIONER_SECRET_*` environment variables
    Env,
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::Extension => f.write_str("extension"),
            SecretSource::Env => f.write_str("env"),
        }
    }
}

impl FromStr for SecretSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "extension" => Ok(SecretSource::Extension),
            "env" => Ok(SecretSource::Env),
            other => Err(Error::config(format!("Unknown secret source '{}'", other))),
        }
    }
}

/// Secret side-channel configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SecretsConfig {
    pub source: SecretSource,

    #[validate(range(min = 1, message = "Extension port must be between 1 and 65535"))]
    pub extension_port: u16,

    /// Ambient session token presented to the extension
    pub session_token: SecretString,
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self {
            source: SecretSource::Extension,
            extension_port: DEFAULT_EXTENSION_PORT,
            session_token: SecretString::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Emit JSON instead of human-readable lines
    pub json_logs: bool,

    /// Log request/response bodies at debug level
    pub log_payloads: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), json_logs: false, log_payloads: false }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.management.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.secrets.extension_port, 2773);
    }

    #[test]
    fn test_attempt_bounds() {
        let mut config = AppConfig::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        config.retry.max_attempts = 11;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_delay_ordering() {
        let mut config = AppConfig::default();
        config.retry.initial_delay_ms = 5000;
        config.retry.max_delay_ms = 1000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_scheme() {
        let mut config = AppConfig::default();
        config.management.base_url = "ftp://api.descope.com".to_string();
        assert!(config.validate().is_err());

        config.management.base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_retry_policy_mapping() {
        let settings = RetrySettings { retry_all_statuses: true, ..Default::default() };
        let policy = settings.policy();

        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(200));
        assert!(policy.is_retryable_status(400));
    }

    #[test]
    fn test_secret_source_parsing() {
        assert_eq!("extension".parse::<SecretSource>().unwrap(), SecretSource::Extension);
        assert_eq!("ENV".parse::<SecretSource>().unwrap(), SecretSource::Env);
        assert!("vault".parse::<SecretSource>().is_err());
    }

    #[test]
    fn test_controller_config() {
        let mut config = AppConfig::default();
        config.management.project_id = Some("P1".to_string());
        config.observability.log_payloads = true;

        let controller = config.controller_config();
        assert_eq!(controller.project_id.as_deref(), Some("P1"));
        assert_eq!(controller.request_timeout, Duration::from_secs(10));
        assert!(controller.log_payloads);
    }
}
