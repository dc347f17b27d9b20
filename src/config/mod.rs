//! # Configuration Management
//!
//! Environment-driven configuration. Every variable is optional and falls back
//! to a default; the result is validated before use.
//!
//! | Variable | Default |
//! |---|---|
//! | `PROVISIONER_PROJECT_ID` | none |
//! | `PROVISIONER_SECRET_NAME` | none |
//! | `PROVISIONER_MANAGEMENT_BASE_URL` | `https://api.descope.com` |
//! | `PROVISIONER_REQUEST_TIMEOUT_SECONDS` | 10 |
//! | `PROVISIONER_RETRY_MAX_ATTEMPTS` | 3 |
//! | `PROVISIONER_RETRY_INITIAL_DELAY_MS` | 200 |
//! | `PROVISIONER_RETRY_MAX_DELAY_MS` | 2000 |
//! | `PROVISIONER_RETRY_ALL_STATUSES` | false |
//! | `PROVISIONER_LOG_PAYLOADS` | false |
//! | `PROVISIONER_DEFAULT_RESOURCE_KIND` | none |
//! | `PROVISIONER_SECRET_SOURCE` | `extension` |
//! | `PARAMETERS_SECRETS_EXTENSION_HTTP_PORT` | 2773 |
//! | `AWS_SESSION_TOKEN` | empty |
//! | `PROVISIONER_LOG_LEVEL` | `info` |
//! | `PROVISIONER_LOG_JSON` | false |

pub mod settings;

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use crate::errors::{Error, Result};
use crate::secrets::{
    EnvVarSecretResolver, ExtensionConfig, ExtensionSecretResolver, SecretResolver, SecretString,
};

pub use settings::{
    AppConfig, ManagementConfig, ObservabilityConfig, RetrySettings, SecretSource, SecretsConfig,
};

impl AppConfig {
    /// Create configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };
        let defaults = AppConfig::default();

        let config = AppConfig {
            management: ManagementConfig {
                project_id: vars.string("PROVISIONER_PROJECT_ID"),
                secret_name: vars.string("PROVISIONER_SECRET_NAME"),
                base_url: vars
                    .string("PROVISIONER_MANAGEMENT_BASE_URL")
                    .unwrap_or(defaults.management.base_url),
                request_timeout_seconds: vars
                    .parse("PROVISIONER_REQUEST_TIMEOUT_SECONDS")?
                    .unwrap_or(defaults.management.request_timeout_seconds),
            },
            retry: RetrySettings {
                max_attempts: vars
                    .parse("PROVISIONER_RETRY_MAX_ATTEMPTS")?
                    .unwrap_or(defaults.retry.max_attempts),
                initial_delay_ms: vars
                    .parse("PROVISIONER_RETRY_INITIAL_DELAY_MS")?
                    .unwrap_or(defaults.retry.initial_delay_ms),
                max_delay_ms: vars
                    .parse("PROVISIONER_RETRY_MAX_DELAY_MS")?
                    .unwrap_or(defaults.retry.max_delay_ms),
                retry_all_statuses: vars
                    .flag("PROVISIONER_RETRY_ALL_STATUSES")?
                    .unwrap_or(defaults.retry.retry_all_statuses),
            },
            secrets: SecretsConfig {
                source: vars.parse("PROVISIONER_SECRET_SOURCE")?.unwrap_or(defaults.secrets.source),
                extension_port: vars
                    .parse("PARAMETERS_SECRETS_EXTENSION_HTTP_PORT")?
                    .unwrap_or(defaults.secrets.extension_port),
                session_token: vars.string("AWS_SESSION_TOKEN").map(SecretString::new).unwrap_or_default(),
            },
            observability: ObservabilityConfig {
                log_level: vars.string("PROVISIONER_LOG_LEVEL").unwrap_or(defaults.observability.log_level),
                json_logs: vars.flag("PROVISIONER_LOG_JSON")?.unwrap_or(defaults.observability.json_logs),
                log_payloads: vars
                    .flag("PROVISIONER_LOG_PAYLOADS")?
                    .unwrap_or(defaults.observability.log_payloads),
            },
            default_resource_kind: vars.parse("PROVISIONER_DEFAULT_RESOURCE_KIND")?,
        };

        config.validate()?;
        Ok(config)
    }

    /// Build the configured secret resolver
    pub fn secret_resolver(&self) -> Result<Arc<dyn SecretResolver>> {
        match self.secrets.source {
            SecretSource::Extension => {
                let config = ExtensionConfig::for_port(
                    self.secrets.extension_port,
                    self.secrets.session_token.clone(),
                );
                Ok(Arc::new(ExtensionSecretResolver::new(config)?))
            }
            SecretSource::Env => Ok(Arc::new(EnvVarSecretResolver::new())),
        }
    }
}

struct Vars<F> {
    lookup: F,
}

impl<F> Vars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.string(key)
            .map(|raw| raw.parse::<T>().map_err(|e| Error::config(format!("Invalid {}: {}", key, e))))
            .transpose()
    }

    fn flag(&self, key: &str) -> Result<Option<bool>> {
        self.string(key)
            .map(|raw| match raw.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" => Ok(false),
                _ => Err(Error::config(format!("Invalid {}: expected a boolean, got '{}'", key, raw))),
            })
            .transpose()
    }
}
