//! # Error Types
//!
//! Error taxonomy for the lifecycle controller and its collaborators using `thiserror`.

use crate::secrets::SecretsError;

/// Custom result type for provisioner operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the identity provisioner
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The secret side-channel could not produce a value
    #[error("Secret '{name}' unavailable: {message}")]
    SecretUnavailable { name: String, message: String },

    /// Connection-level failure talking to the remote platform
    #[error("Transport error on {method} {path}: {message}")]
    Transport { method: String, path: String, message: String },

    /// The remote platform answered with a non-success status
    #[error("Remote API error on {method} {path} (status: {status}): {body}")]
    RemoteApi { method: String, path: String, status: u16, body: String },

    /// A required declared property is missing or malformed
    #[error("Validation error: {message}")]
    Validation { message: String, field: Option<String> },

    /// Serialization/deserialization errors
    #[error("Serialization error: {context}")]
    Serialization {
        #[source]
        source: serde_json::Error,
        context: String,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// The operation is not available for the resource kind
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a secret-unavailable error
    pub fn secret_unavailable<N: Into<String>, M: Into<String>>(name: N, message: M) -> Self {
        Self::SecretUnavailable { name: name.into(), message: message.into() }
    }

    /// Create a transport error with request context
    pub fn transport<P: Into<String>, M: Into<String>>(
        method: &reqwest::Method,
        path: P,
        message: M,
    ) -> Self {
        Self::Transport { method: method.to_string(), path: path.into(), message: message.into() }
    }

    /// Create a remote API error with request context
    pub fn remote_api<P: Into<String>, B: Into<String>>(
        method: &reqwest::Method,
        path: P,
        status: u16,
        body: B,
    ) -> Self {
        Self::RemoteApi { method: method.to_string(), path: path.into(), status, body: body.into() }
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation { message: message.into(), field: None }
    }

    /// Create a validation error with field information
    pub fn validation_field<S: Into<String>, F: Into<String>>(message: S, field: F) -> Self {
        Self::Validation { message: message.into(), field: Some(field.into()) }
    }

    /// Create a serialization error with context
    pub fn serialization<S: Into<String>>(source: serde_json::Error, context: S) -> Self {
        Self::Serialization { source, context: context.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create an unsupported operation error
    pub fn unsupported<S: Into<String>>(message: S) -> Self {
        Self::Unsupported(message.into())
    }

    /// Create a new internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// HTTP status of the remote response, if this error carries one
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::RemoteApi { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Response body of the remote error, if this error carries one
    pub fn remote_body(&self) -> Option<&str> {
        match self {
            Error::RemoteApi { body, .. } => Some(body),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::serialization(error, "JSON serialization failed")
    }
}

impl From<SecretsError> for Error {
    fn from(error: SecretsError) -> Self {
        Self::SecretUnavailable { name: error.secret_name().to_string(), message: error.to_string() }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let error_messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string()))
                    .collect();
                format!("{}: {}", field, error_messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::config(format!("Invalid configuration: {}", message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = Error::config("missing base url");
        assert!(matches!(error, Error::Config(_)));
        assert_eq!(error.to_string(), "Configuration error: missing base url");
    }

    #[test]
    fn test_remote_api_error_carries_context() {
        let error = Error::remote_api(&reqwest::Method::POST, "/v1/mgmt/user/create", 409, "exists");
        assert_eq!(error.status(), Some(409));
        assert_eq!(error.remote_body(), Some("exists"));

        let message = error.to_string();
        assert!(message.contains("POST"));
        assert!(message.contains("/v1/mgmt/user/create"));
        assert!(message.contains("409"));
    }

    #[test]
    fn test_transport_error_has_no_status() {
        let error = Error::transport(&reqwest::Method::GET, "/v1/mgmt/user", "connection refused");
        assert_eq!(error.status(), None);
        assert!(error.remote_body().is_none());
    }

    #[test]
    fn test_validation_error_field() {
        let error = Error::validation_field("login id is required", "loginId");
        if let Error::Validation { field, .. } = error {
            assert_eq!(field, Some("loginId".to_string()));
        } else {
            panic!("expected validation error");
        }
    }

    #[test]
    fn test_secrets_error_conversion() {
        let error: Error = SecretsError::missing_value("/mgmt/key").into();
        match error {
            Error::SecretUnavailable { name, message } => {
                assert_eq!(name, "/mgmt/key");
                assert!(message.contains("Parameter.Value"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Serialization { .. }));
    }
}
