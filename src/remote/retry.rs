//! Bounded retry with exponential backoff and jitter.
//!
//! Every outbound call to the management platform (and response delivery to
//! the orchestrator) runs through [`retry_with_backoff`]. The loop is always
//! bounded by [`RetryPolicy::max_attempts`]; there is no infinite mode.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::{error, warn};

use crate::errors::Error;

/// Explicit retry policy injected into the API client.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first one. Always at least 1.
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Multiplier applied to the delay after each retry
    pub backoff_multiplier: f64,
    /// Apply a random 0.5x..1.5x factor to each delay
    pub jitter: bool,
    /// Treat every status >= 400 as retryable, not only 408/429/5xx
    pub retry_client_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            jitter: true,
            retry_client_errors: false,
        }
    }
}

impl RetryPolicy {
    /// Default policy with a different attempt cap (clamped to at least 1).
    pub fn with_max_attempts(attempts: u32) -> Self {
        Self { max_attempts: attempts.max(1), ..Default::default() }
    }

    /// Retry on every failure status, as the platform's own SDK clients do.
    pub fn retry_all(mut self) -> Self {
        self.retry_client_errors = true;
        self
    }

    /// No waiting between attempts. Used by tests and by callers that want the
    /// attempt bound without backoff.
    pub fn immediate(mut self) -> Self {
        self.initial_delay = Duration::ZERO;
        self.max_delay = Duration::ZERO;
        self.jitter = false;
        self
    }

    /// Policy for delivering the lifecycle response to the orchestrator.
    pub fn response_delivery() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(8),
            backoff_multiplier: 2.0,
            jitter: true,
            retry_client_errors: false,
        }
    }

    /// Whether an HTTP status is worth another attempt.
    pub fn is_retryable_status(&self, status: u16) -> bool {
        match status {
            408 | 429 => true,
            500..=599 => true,
            400..=499 => self.retry_client_errors,
            _ => false,
        }
    }

    /// Whether a failed attempt should be retried under this policy.
    pub fn should_retry(&self, error: &Error) -> bool {
        match error {
            Error::Transport { .. } => true,
            Error::RemoteApi { status, .. } => self.is_retryable_status(*status),
            _ => false,
        }
    }

    /// Un-jittered delay before retry number `attempt` (1-based: the delay after
    /// the first failed attempt is `delay_for_attempt(1)`).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(32) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        Duration::from_secs_f64(secs.min(self.max_delay.as_secs_f64()))
    }

    fn jittered(&self, delay: Duration) -> Duration {
        if !self.jitter || delay.is_zero() {
            return delay;
        }
        let factor = rand::thread_rng().gen_range(0.5..1.5);
        Duration::from_secs_f64(delay.as_secs_f64() * factor)
    }
}

/// Execute an async operation under a retry policy.
///
/// `operation` receives the 1-based attempt number. It is retried while
/// `should_retry` returns true for its error and attempts remain; the last
/// error is returned unchanged.
pub async fn retry_with_backoff<F, Fut, T, E, P>(
    policy: &RetryPolicy,
    operation_name: &str,
    should_retry: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
    P: Fn(&E) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0u32;

    loop {
        attempt += 1;

        match operation(attempt).await {
            Ok(result) => return Ok(result),
            Err(e) => {
                if attempt >= max_attempts || !should_retry(&e) {
                    error!(
                        operation = %operation_name,
                        attempt = attempt,
                        error = %e,
                        "Operation failed, giving up"
                    );
                    return Err(e);
                }

                let delay = policy.jittered(policy.delay_for_attempt(attempt));

                warn!(
                    operation = %operation_name,
                    attempt = attempt,
                    error = %e,
                    delay_ms = delay.as_millis() as u64,
                    "Operation failed, retrying"
                );

                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
