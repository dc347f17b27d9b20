//! Integration tests for configuration management
//!
//! These tests read the real process environment, so they are serialized
//! behind a mutex and restore every variable they touch.

mod common;

use std::env;
use std::sync::Mutex;

use identity_provisioner::controller::{LifecycleController, LifecycleEvent, LifecycleResult, ResourceKind};
use identity_provisioner::{AppConfig, Result};
use serde_json::json;
use tracing_test::traced_test;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::props;

// Use a mutex to serialize tests that modify environment variables
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Sets variables and restores their previous values on drop.
struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl EnvGuard {
    fn set(vars: &[(&str, &str)]) -> Self {
        let lock = ENV_MUTEX.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let saved = vars.iter().map(|(key, _)| (key.to_string(), env::var(key).ok())).collect();
        for (key, value) in vars {
            env::set_var(key, value);
        }
        Self { saved, _lock: lock }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, original) in self.saved.drain(..) {
            match original {
                Some(value) => env::set_var(&key, value),
                None => env::remove_var(&key),
            }
        }
    }
}

#[test]
fn test_config_environment_integration() -> Result<()> {
    let _env = EnvGuard::set(&[
        ("PROVISIONER_PROJECT_ID", "P2env"),
        ("PROVISIONER_MANAGEMENT_BASE_URL", "http://127.0.0.1:9"),
        ("PROVISIONER_RETRY_MAX_ATTEMPTS", "4"),
        ("PROVISIONER_SECRET_SOURCE", "env"),
    ]);

    let config = AppConfig::from_env()?;
    assert_eq!(config.management.project_id.as_deref(), Some("P2env"));
    assert_eq!(config.management.base_url, "http://127.0.0.1:9");
    assert_eq!(config.retry_policy().max_attempts, 4);
    Ok(())
}

#[test]
fn test_invalid_environment_is_rejected() {
    let _env = EnvGuard::set(&[("PROVISIONER_RETRY_MAX_ATTEMPTS", "invalid")]);
    assert!(AppConfig::from_env().is_err());
}

#[tokio::test]
#[traced_test]
async fn test_env_secret_source_drives_controller() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/mgmt/user/create"))
        .and(header("authorization", "Bearer P2env:K2-from-env"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "usr_env"})))
        .expect(1)
        .mount(&server)
        .await;

    let base_url = server.uri();
    let _env = EnvGuard::set(&[
        ("PROVISIONER_PROJECT_ID", "P2env"),
        ("PROVISIONER_SECRET_NAME", "/descope/mgmt-key"),
        ("PROVISIONER_MANAGEMENT_BASE_URL", base_url.as_str()),
        ("PROVISIONER_SECRET_SOURCE", "env"),
        ("PROVISIONER_SECRET__DESCOPE_MGMT_KEY", "K2-from-env"),
    ]);

    let config = AppConfig::from_env().unwrap();
    let controller = LifecycleController::new(config.controller_config(), config.secret_resolver().unwrap()).unwrap();

    let result = controller.handle(&LifecycleEvent::create(ResourceKind::User, props(&[("loginId", "dana")]))).await;

    assert_eq!(result.physical_id(), Some("usr_env"));
    assert!(matches!(result, LifecycleResult::Success { .. }));
    assert!(!logs_contain("K2-from-env"));
}
