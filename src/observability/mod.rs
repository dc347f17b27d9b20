//! # Observability
//!
//! Structured logging for the provisioner: subscriber setup, the
//! per-invocation `lifecycle_span!` macro and the payload log target.

pub mod logging;

pub use logging::{init_logging, log_config_info, PAYLOAD_TARGET};
