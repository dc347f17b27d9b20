//! Error types for secret resolution.

use thiserror::Error;

/// Result type for secret resolution.
pub type Result<T> = std::result::Result<T, SecretsError>;

/// Ways the secret side-channel can fail to produce a value.
///
/// None of these are retried; the caller treats them as fatal for the invocation.
#[derive(Error, Debug)]
pub enum SecretsError {
    /// The side-channel could not be reached at all.
    #[error("Secret side-channel unreachable while resolving '{name}': {message}")]
    Unreachable { name: String, message: String },

    /// The side-channel answered with a non-success status.
    #[error("Secret side-channel returned status {status} for '{name}'")]
    Status { name: String, status: u16 },

    /// The response body did not contain `Parameter.Value`.
    #[error("Secret '{name}' response did not contain Parameter.Value")]
    MissingValue { name: String },

    /// The secret does not exist in the configured source.
    #[error("Secret not found: {name}")]
    NotFound { name: String },

    /// Invalid secret reference.
    #[error("Invalid secret name '{name}': {reason}")]
    InvalidName { name: String, reason: String },
}

impl SecretsError {
    /// Create an unreachable error.
    pub fn unreachable(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unreachable { name: name.into(), message: message.into() }
    }

    /// Create a status error.
    pub fn status(name: impl Into<String>, status: u16) -> Self {
        Self::Status { name: name.into(), status }
    }

    /// Create a missing value error.
    pub fn missing_value(name: impl Into<String>) -> Self {
        Self::MissingValue { name: name.into() }
    }

    /// Create a not found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create an invalid name error.
    pub fn invalid_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into(), reason: reason.into() }
    }

    /// The secret reference this error is about.
    pub fn secret_name(&self) -> &str {
        match self {
            Self::Unreachable { name, .. }
            | Self::Status { name, .. }
            | Self::MissingValue { name }
            | Self::NotFound { name }
            | Self::InvalidName { name, .. } => name,
        }
    }
}
