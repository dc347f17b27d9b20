//! Secret resolution for management credentials.
//!
//! The controller never receives a management key in the event payload. It
//! receives a *reference* (a parameter name) and resolves it through a
//! [`SecretResolver`] once per invocation.
//!
//! # Backends
//!
//! - [`ExtensionSecretResolver`]: the host's loopback parameters-and-secrets
//!   extension. Production backend.
//! - [`EnvVarSecretResolver`]: `PROVISIONER_SECRET_*` variables, for local runs.
//!
//! # Security Considerations
//!
//! - Resolved values are wrapped in [`SecretString`] and never logged
//! - Nothing is cached; each call is a fresh lookup
//! - No retries; a misconfigured reference fails the invocation immediately

pub mod client;
pub mod env;
pub mod error;
pub mod extension;
pub mod types;

pub use client::SecretResolver;
pub use env::EnvVarSecretResolver;
pub use error::{Result, SecretsError};
pub use extension::{
    ExtensionConfig, ExtensionSecretResolver, DEFAULT_EXTENSION_PORT, SESSION_TOKEN_HEADER,
};
pub use types::SecretString;
