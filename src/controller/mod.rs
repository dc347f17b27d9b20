//! # Resource Lifecycle Controller
//!
//! Maps one lifecycle event (Create, Update or Delete) onto at most one
//! mutating call against the management platform and reports a deterministic
//! [`LifecycleResult`].
//!
//! Each invocation:
//! 1. validates the declared properties (no remote call on failure),
//! 2. resolves credentials exactly once through the [`SecretResolver`],
//! 3. performs the operation through the shared [`ApiClient`],
//! 4. reinterprets "already exists" on Create and "not found" on Delete as
//!    success, using the injected [`ErrorClassifier`].
//!
//! The controller holds no mutable state, so one instance serves concurrent
//! invocations.

pub mod access_key;
pub mod classify;
pub mod properties;
pub mod types;
pub mod user;

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn, Instrument};

use crate::errors::{Error, Result};
use crate::lifecycle_span;
use crate::platform::Credentials;
use crate::remote::{ApiClient, ApiClientConfig, RetryPolicy};
use crate::secrets::SecretResolver;

pub use classify::{ErrorClassifier, ErrorKind, SubstringClassifier};
pub use properties::{AccessKeyProperties, UserProperties};
pub use types::{
    is_placeholder, placeholder_physical_id, FailureKind, LifecycleEvent, LifecycleResult,
    OutputData, Properties, RequestType, ResourceKind, PLACEHOLDER_PREFIX,
};

/// Explicit construction parameters; nothing is read from process globals.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Project id used when the event does not declare one
    pub project_id: Option<String>,
    /// Secret reference used when the event does not declare one
    pub secret_name: Option<String>,
    pub base_url: String,
    pub retry: RetryPolicy,
    pub request_timeout: Duration,
    pub log_payloads: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        let client = ApiClientConfig::default();
        Self {
            project_id: None,
            secret_name: None,
            base_url: client.base_url,
            retry: client.retry,
            request_timeout: client.timeout,
            log_payloads: client.log_payloads,
        }
    }
}

impl ControllerConfig {
    pub fn client_config(&self) -> ApiClientConfig {
        ApiClientConfig {
            base_url: self.base_url.clone(),
            timeout: self.request_timeout,
            retry: self.retry.clone(),
            log_payloads: self.log_payloads,
        }
    }
}

/// Secret reference and project id, validated but not yet resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CredentialRefs {
    project_id: String,
    secret_name: String,
}

#[derive(Clone)]
pub struct LifecycleController {
    client: ApiClient,
    resolver: Arc<dyn SecretResolver>,
    classifier: Arc<dyn ErrorClassifier>,
    config: ControllerConfig,
}

impl std::fmt::Debug for LifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleController")
            .field("client", &self.client)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl LifecycleController {
    pub fn new(config: ControllerConfig, resolver: Arc<dyn SecretResolver>) -> Result<Self> {
        let client = ApiClient::new(config.client_config())?;
        Ok(Self { client, resolver, classifier: Arc::new(SubstringClassifier), config })
    }

    pub fn with_classifier(mut self, classifier: Arc<dyn ErrorClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Handle one lifecycle event. Never panics and never returns an error;
    /// every failure becomes [`LifecycleResult::Failure`].
    pub async fn handle(&self, event: &LifecycleEvent) -> LifecycleResult {
        let correlation_id = event.correlation_id.as_deref().unwrap_or("-");
        let span = lifecycle_span!(event.request_type, event.kind, correlation_id);

        async move {
            if let Some(id) = event.physical_id().filter(|id| is_placeholder(id)) {
                if event.request_type == RequestType::Delete {
                    info!(physical_id = %id, "Resource was never provisioned, nothing to delete");
                    return LifecycleResult::success(id, OutputData::new());
                }
            }

            let result = match event.kind {
                ResourceKind::User => self.handle_user(event).await,
                ResourceKind::AccessKey => self.handle_access_key(event).await,
            };

            match &result {
                LifecycleResult::Success { physical_id, .. } => {
                    tracing::Span::current().record("physical_id", physical_id.as_str());
                    info!(physical_id = %physical_id, "Lifecycle operation succeeded");
                }
                LifecycleResult::Failure { kind, message } => {
                    warn!(failure = %kind, message = %message, "Lifecycle operation failed");
                }
            }
            result
        }
        .instrument(span)
        .await
    }

    /// Resolve credentials for a direct management call (operator commands).
    pub async fn credentials(&self, properties: &Properties) -> Result<Credentials> {
        let refs = self.credential_refs(properties)?;
        self.resolve_credentials(&refs).await
    }

    pub(crate) fn credential_refs(&self, properties: &Properties) -> Result<CredentialRefs> {
        let project_id = properties::lookup(properties, properties::PROJECT_ID_KEYS)
            .or(self.config.project_id.as_deref().filter(|s| !s.trim().is_empty()))
            .ok_or_else(|| Error::validation_field("No project id declared or configured", "projectId"))?;

        let secret_name = properties::lookup(properties, properties::SECRET_NAME_KEYS)
            .or(self.config.secret_name.as_deref().filter(|s| !s.trim().is_empty()))
            .ok_or_else(|| {
                Error::validation_field("No secret reference declared or configured", "secretName")
            })?;

        Ok(CredentialRefs { project_id: project_id.to_string(), secret_name: secret_name.to_string() })
    }

    pub(crate) async fn resolve_credentials(&self, refs: &CredentialRefs) -> Result<Credentials> {
        let secret = self.resolver.resolve(&refs.secret_name).await?;
        Ok(Credentials::new(refs.project_id.clone(), secret))
    }

    pub(crate) fn classify(&self, error: &Error) -> ErrorKind {
        self.classifier.classify(error)
    }
}

/// Map an error to a failure result, keeping validation and secret failures
/// distinct from the operation-specific kind.
pub(crate) fn failure_for(error: &Error, operation_kind: FailureKind) -> LifecycleResult {
    let kind = match error {
        Error::Validation { .. } => FailureKind::ValidationError,
        Error::SecretUnavailable { .. } => FailureKind::SecretUnavailable,
        _ => operation_kind,
    };
    LifecycleResult::failure(kind, error.to_string())
}

/// Physical id required by Update and Delete.
pub(crate) fn require_physical_id(event: &LifecycleEvent) -> Result<&str> {
    event.physical_id().ok_or_else(|| {
        Error::validation_field(
            format!("{} requires a physical resource id", event.request_type),
            "PhysicalResourceId",
        )
    })
}
