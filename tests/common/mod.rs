//! Common test utilities for all integration tests.
//!
//! Provides an in-memory secret resolver and controller construction against
//! a wiremock management API.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use identity_provisioner::controller::{ControllerConfig, LifecycleController, Properties};
use identity_provisioner::remote::RetryPolicy;
use identity_provisioner::secrets::{self, SecretResolver, SecretString, SecretsError};
use wiremock::MockServer;

pub const PROJECT_ID: &str = "P2testproject";
pub const SECRET_NAME: &str = "/descope/mgmt-key";
pub const SECRET_VALUE: &str = "K2-test-management-key";

/// Resolver backed by a fixed map that records every lookup.
#[derive(Debug, Default)]
pub struct RecordingResolver {
    values: HashMap<String, String>,
    lookups: Mutex<Vec<String>>,
}

impl RecordingResolver {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            values: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            lookups: Mutex::new(Vec::new()),
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl SecretResolver for RecordingResolver {
    async fn resolve(&self, name: &str) -> secrets::Result<SecretString> {
        self.lookups.lock().unwrap().push(name.to_string());
        self.values.get(name).map(SecretString::new).ok_or_else(|| SecretsError::not_found(name))
    }
}

pub fn default_resolver() -> Arc<RecordingResolver> {
    Arc::new(RecordingResolver::new(&[(SECRET_NAME, SECRET_VALUE)]))
}

pub fn controller_config(server: &MockServer) -> ControllerConfig {
    ControllerConfig {
        project_id: Some(PROJECT_ID.to_string()),
        secret_name: Some(SECRET_NAME.to_string()),
        base_url: server.uri(),
        retry: RetryPolicy::default().immediate(),
        request_timeout: Duration::from_secs(2),
        log_payloads: false,
    }
}

pub fn controller(server: &MockServer, resolver: Arc<dyn SecretResolver>) -> LifecycleController {
    LifecycleController::new(controller_config(server), resolver).expect("controller")
}

pub fn props(pairs: &[(&str, &str)]) -> Properties {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

pub fn bearer(secret: &str) -> String {
    format!("Bearer {}:{}", PROJECT_ID, secret)
}
