//! Custom-resource request and response envelopes.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::controller::{OutputData, Properties, RequestType, ResourceKind};
use crate::errors::{Error, Result};

/// Property injected by the orchestrator that is never forwarded.
pub const SERVICE_TOKEN_PROPERTY: &str = "ServiceToken";

/// Longest reason string sent back; keeps the body under the 4 KiB cap.
pub const MAX_REASON_BYTES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceRequest {
    pub request_type: RequestType,
    #[serde(rename = "ResponseURL", default, skip_serializing_if = "Option::is_none")]
    pub response_url: Option<String>,
    #[serde(default)]
    pub stack_id: String,
    #[serde(default)]
    pub request_id: String,
    #[serde(default)]
    pub resource_type: String,
    #[serde(default)]
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    #[serde(default)]
    pub resource_properties: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_resource_properties: Option<Map<String, Value>>,
}

impl CustomResourceRequest {
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| Error::serialization(e, "Invalid custom resource request"))
    }

    /// Resource kind named by `ResourceType`, e.g. `Custom::DescopeUser`.
    pub fn resource_kind(&self) -> Option<ResourceKind> {
        resource_kind_for(&self.resource_type)
    }

    pub fn properties(&self) -> Properties {
        to_properties(&self.resource_properties)
    }

    pub fn old_properties(&self) -> Option<Properties> {
        self.old_resource_properties.as_ref().map(to_properties)
    }
}

/// Infer the resource kind from a custom resource type name.
pub fn resource_kind_for(resource_type: &str) -> Option<ResourceKind> {
    let name = resource_type.strip_prefix("Custom::").unwrap_or(resource_type).to_ascii_lowercase();
    if name.ends_with("accesskey") || name.ends_with("client") {
        Some(ResourceKind::AccessKey)
    } else if name.ends_with("user") {
        Some(ResourceKind::User)
    } else {
        None
    }
}

/// Flatten declared properties to strings. Nulls and the service token are
/// dropped; non-string values are kept as their JSON text.
pub fn to_properties(raw: &Map<String, Value>) -> Properties {
    raw.iter()
        .filter(|(key, _)| key.as_str() != SERVICE_TOKEN_PROPERTY)
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(s) => Some((key.clone(), s.clone())),
            other => Some((key.clone(), other.to_string())),
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResponseStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomResourceResponse {
    pub status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub physical_resource_id: String,
    pub stack_id: String,
    pub request_id: String,
    pub logical_resource_id: String,
    pub no_echo: bool,
    #[serde(default)]
    pub data: OutputData,
}

/// Cut `reason` to at most [`MAX_REASON_BYTES`] bytes of UTF-8, on a char boundary.
pub fn truncate_reason(reason: &str) -> String {
    if reason.len() <= MAX_REASON_BYTES {
        return reason.to_string();
    }
    let mut end = MAX_REASON_BYTES - "...".len();
    while !reason.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &reason[..end])
}
