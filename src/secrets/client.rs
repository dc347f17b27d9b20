//! Core secret resolver trait.

use async_trait::async_trait;

use super::error::Result;
use super::types::SecretString;

/// Resolves a logical secret reference to its plaintext value.
///
/// # Contract
///
/// - Every call performs a fresh lookup. Implementations MUST NOT cache values
///   across calls, so one lifecycle invocation never observes a value resolved
///   for another.
/// - Implementations MUST NOT retry; failures are surfaced to the caller as-is.
/// - Implementations MUST NOT log the resolved value.
#[async_trait]
pub trait SecretResolver: Send + Sync {
    /// Resolve `name` to its plaintext.
    ///
    /// # Errors
    ///
    /// - [`SecretsError::Unreachable`](super::SecretsError::Unreachable) if the source cannot be reached
    /// - [`SecretsError::Status`](super::SecretsError::Status) on a non-2xx answer
    /// - [`SecretsError::MissingValue`](super::SecretsError::MissingValue) if the value field is absent
    async fn resolve(&self, name: &str) -> Result<SecretString>;
}
