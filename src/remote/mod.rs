//! Resilient HTTP access to the management platform.
//!
//! [`ApiClient`] owns the transport, the [`RetryPolicy`] and the default
//! [`PayloadEncoder`]. Credentials are never stored on the client; they travel
//! as a per-request header.

pub mod client;
pub mod encoding;
pub mod retry;

pub use client::{ApiClient, ApiClientConfig, ApiRequest};
pub use encoding::{FormEncoder, JsonEncoder, PayloadEncoder};
pub use retry::{retry_with_backoff, RetryPolicy};
