//! # Structured Logging
//!
//! Subscriber initialisation and span macros built on the tracing ecosystem.
//!
//! Request and response bodies are emitted under the [`PAYLOAD_TARGET`] target
//! at debug level, and only when payload logging is switched on, so they can be
//! filtered independently, e.g. `RUST_LOG=info,identity_provisioner::payload=debug`.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ObservabilityConfig;
use crate::errors::{Error, Result};

/// Tracing target for request/response bodies.
pub const PAYLOAD_TARGET: &str = "identity_provisioner::payload";

/// Create the per-invocation span for a lifecycle event.
///
/// ```rust,ignore
/// let span = lifecycle_span!(RequestType::Create, ResourceKind::User, "req-1");
/// ```
#[macro_export]
macro_rules! lifecycle_span {
    ($request_type:expr, $kind:expr, $correlation_id:expr) => {
        tracing::info_span!(
            "lifecycle",
            request_type = %$request_type,
            resource_kind = %$kind,
            correlation_id = %$correlation_id,
            invocation_id = %uuid::Uuid::new_v4(),
            physical_id = tracing::field::Empty
        )
    };
    ($request_type:expr, $kind:expr, $correlation_id:expr, $($field:tt)*) => {
        tracing::info_span!(
            "lifecycle",
            request_type = %$request_type,
            resource_kind = %$kind,
            correlation_id = %$correlation_id,
            invocation_id = %uuid::Uuid::new_v4(),
            physical_id = tracing::field::Empty,
            $($field)*
        )
    };
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level. Calling this twice returns a
/// configuration error rather than panicking.
pub fn init_logging(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::config(format!("Invalid log filter '{}': {}", config.log_level, e)))?;

    let json_layer = config.json_logs.then(|| tracing_subscriber::fmt::layer().json().with_target(true));
    let text_layer = (!config.json_logs).then(|| tracing_subscriber::fmt::layer().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .map_err(|e| Error::config(format!("Failed to initialize logging: {}", e)))
}

/// Log effective configuration at startup. Secrets are not part of it.
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        base_url = %config.management.base_url,
        request_timeout_seconds = config.management.request_timeout_seconds,
        retry_max_attempts = config.retry.max_attempts,
        retry_all_statuses = config.retry.retry_all_statuses,
        secret_source = %config.secrets.source,
        project_id_configured = config.management.project_id.is_some(),
        secret_name_configured = config.management.secret_name.is_some(),
        log_payloads = config.observability.log_payloads,
        "Identity provisioner configuration"
    );
}
