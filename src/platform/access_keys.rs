//! Access key operations.
//!
//! Create responses also carry the key's cleartext. It is never extracted,
//! logged or returned as an output attribute.

use serde::Serialize;
use serde_json::{json, Value};

use super::{string_at, ManagementApi};
use crate::errors::Result;

pub const CREATE_PATH: &str = "/v1/mgmt/accesskey/create";
pub const DELETE_PATH: &str = "/v1/mgmt/accesskey/delete";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccessKey {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Zero means the key never expires.
    pub expire_time: u64,
}

/// Identifiers of a created key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedAccessKey {
    pub id: String,
    pub client_id: Option<String>,
}

impl ManagementApi<'_> {
    pub async fn create_access_key(&self, key: &NewAccessKey) -> Result<Value> {
        self.post(CREATE_PATH, key).await
    }

    pub async fn delete_access_key(&self, id: &str) -> Result<Value> {
        self.post(DELETE_PATH, &json!({ "id": id })).await
    }
}

/// Key identifiers from a create response (`key.id`/`key.clientId`, or top-level).
pub fn extract_access_key(response: &Value) -> Option<CreatedAccessKey> {
    let id = string_at(response, "/key/id").or_else(|| string_at(response, "/id"))?;
    let client_id = string_at(response, "/key/clientId").or_else(|| string_at(response, "/clientId"));
    Some(CreatedAccessKey { id, client_id })
}
