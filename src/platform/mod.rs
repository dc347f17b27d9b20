//! Typed facade over the identity platform's management API.
//!
//! [`ManagementApi`] borrows a shared [`ApiClient`] and carries the
//! authorization header for one set of [`Credentials`]. It is created per
//! invocation and dropped with the credentials.

pub mod access_keys;
pub mod users;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Method;
use serde::Serialize;
use serde_json::Value;

use crate::errors::{Error, Result};
use crate::remote::{ApiClient, ApiRequest};
use crate::secrets::SecretString;

pub use access_keys::{CreatedAccessKey, NewAccessKey};
pub use users::{NewUser, UserStatus, UserUpdate};

/// Resolved project id and management key for a single invocation.
#[derive(Debug, Clone)]
pub struct Credentials {
    project_id: String,
    secret: SecretString,
}

impl Credentials {
    pub fn new(project_id: impl Into<String>, secret: SecretString) -> Self {
        Self { project_id: project_id.into(), secret }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// `Authorization` header value, marked sensitive so it is never printed.
    pub fn authorization(&self) -> Result<HeaderValue> {
        let mut value =
            HeaderValue::from_str(&format!("Bearer {}:{}", self.project_id, self.secret.expose_secret()))
                .map_err(|_| Error::validation_field("Credentials contain invalid header characters", "projectId"))?;
        value.set_sensitive(true);
        Ok(value)
    }
}

/// Management API bound to one set of credentials.
#[derive(Debug, Clone)]
pub struct ManagementApi<'a> {
    client: &'a ApiClient,
    authorization: HeaderValue,
}

impl<'a> ManagementApi<'a> {
    pub fn new(client: &'a ApiClient, credentials: &Credentials) -> Result<Self> {
        Ok(Self { client, authorization: credentials.authorization()? })
    }

    fn request(&self, method: Method, path: &str) -> ApiRequest {
        ApiRequest::new(method, path).header(AUTHORIZATION, self.authorization.clone())
    }

    async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Value> {
        let payload = serde_json::to_value(body)
            .map_err(|e| Error::serialization(e, format!("Failed to build request body for {}", path)))?;
        self.client.call(&self.request(Method::POST, path).payload(payload)).await
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value> {
        let request = query
            .iter()
            .fold(self.request(Method::GET, path), |request, (key, value)| request.query(*key, *value));
        self.client.call(&request).await
    }
}

/// Non-empty string at a JSON pointer.
pub(crate) fn string_at(value: &Value, pointer: &str) -> Option<String> {
    value.pointer(pointer).and_then(Value::as_str).filter(|s| !s.is_empty()).map(str::to_string)
}
