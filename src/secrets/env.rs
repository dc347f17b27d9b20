//! Environment variable secret resolver.
//!
//! Intended for **local development only**: running the binary outside the
//! host, where no side-channel extension exists. Secrets are read from
//! variables with the `PROVISIONER_SECRET_` prefix; the reference name is
//! upper-cased and every non-alphanumeric character becomes `_`.
//!
//! ```bash
//! # resolves the reference "/descope/mgmt-key"
//! export PROVISIONER_SECRET__DESCOPE_MGMT_KEY="K2..."
//! ```

use async_trait::async_trait;
use std::env;

use super::client::SecretResolver;
use super::error::{Result, SecretsError};
use super::types::SecretString;

/// Environment variable prefix for secrets.
const SECRET_PREFIX: &str = "PROVISIONER_SECRET_";

/// Resolver reading from process environment (development only).
#[derive(Debug, Clone, Default)]
pub struct EnvVarSecretResolver {}

impl EnvVarSecretResolver {
    /// Creates a new environment variable resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Converts a secret reference to the environment variable name.
    pub fn key_to_env_var(name: &str) -> String {
        let suffix: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        format!("{}{}", SECRET_PREFIX, suffix)
    }
}

#[async_trait]
impl SecretResolver for EnvVarSecretResolver {
    async fn resolve(&self, name: &str) -> Result<SecretString> {
        if name.trim().is_empty() {
            return Err(SecretsError::invalid_name(name, "secret name cannot be empty"));
        }

        env::var(Self::key_to_env_var(name))
            .map(SecretString::new)
            .map_err(|_| SecretsError::not_found(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_to_env_var() {
        assert_eq!(EnvVarSecretResolver::key_to_env_var("mgmt_key"), "PROVISIONER_SECRET_MGMT_KEY");
        assert_eq!(
            EnvVarSecretResolver::key_to_env_var("/descope/mgmt-key"),
            "PROVISIONER_SECRET__DESCOPE_MGMT_KEY"
        );
    }

    #[tokio::test]
    async fn test_resolve_not_found() {
        let resolver = EnvVarSecretResolver::new();
        let err = resolver.resolve("definitely_not_set_anywhere").await.unwrap_err();
        assert!(matches!(err, SecretsError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_from_env() {
        env::set_var("PROVISIONER_SECRET_ENV_RESOLVER_TEST", "env-value");

        let value = EnvVarSecretResolver::new().resolve("env-resolver-test").await.unwrap();
        assert_eq!(value.expose_secret(), "env-value");

        env::remove_var("PROVISIONER_SECRET_ENV_RESOLVER_TEST");
    }
}
