//! Lifecycle event and result types.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;

/// Declared resource properties, keyed by property name.
pub type Properties = BTreeMap<String, String>;

/// Output attributes reported back to the orchestrator.
pub type OutputData = BTreeMap<String, String>;

/// Prefix of the physical id reported for a Create that never produced a
/// remote entity. Deletes of such ids complete without a remote call.
pub const PLACEHOLDER_PREFIX: &str = "unprovisioned:";

/// Deterministic placeholder id for a failed Create.
pub fn placeholder_physical_id(logical_id: &str, request_id: &str) -> String {
    format!("{}{}:{}", PLACEHOLDER_PREFIX, logical_id, request_id)
}

pub fn is_placeholder(physical_id: &str) -> bool {
    physical_id.starts_with(PLACEHOLDER_PREFIX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    Create,
    Update,
    Delete,
}

impl fmt::Display for RequestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestType::Create => "Create",
            RequestType::Update => "Update",
            RequestType::Delete => "Delete",
        };
        f.write_str(name)
    }
}

/// Kind of remote entity a custom resource manages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    User,
    AccessKey,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::User => f.write_str("user"),
            ResourceKind::AccessKey => f.write_str("access_key"),
        }
    }
}

impl FromStr for ResourceKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String =
            s.chars().filter(|c| c.is_ascii_alphanumeric()).collect::<String>().to_ascii_lowercase();
        match normalized.as_str() {
            "user" => Ok(ResourceKind::User),
            "accesskey" | "client" => Ok(ResourceKind::AccessKey),
            _ => Err(Error::config(format!("Unknown resource kind '{}'", s))),
        }
    }
}

/// One lifecycle event as seen by the controller. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleEvent {
    pub request_type: RequestType,
    pub kind: ResourceKind,
    pub properties: Properties,
    /// Properties before the change (Update only)
    pub old_properties: Option<Properties>,
    /// Physical id bound by an earlier Create (Update/Delete)
    pub physical_id: Option<String>,
    /// Opaque request token, used only for log correlation
    pub correlation_id: Option<String>,
}

impl LifecycleEvent {
    pub fn create(kind: ResourceKind, properties: Properties) -> Self {
        Self {
            request_type: RequestType::Create,
            kind,
            properties,
            old_properties: None,
            physical_id: None,
            correlation_id: None,
        }
    }

    pub fn update(kind: ResourceKind, physical_id: impl Into<String>, properties: Properties) -> Self {
        Self {
            request_type: RequestType::Update,
            physical_id: Some(physical_id.into()),
            ..Self::create(kind, properties)
        }
    }

    pub fn delete(kind: ResourceKind, physical_id: impl Into<String>, properties: Properties) -> Self {
        Self {
            request_type: RequestType::Delete,
            physical_id: Some(physical_id.into()),
            ..Self::create(kind, properties)
        }
    }

    pub fn with_old_properties(mut self, old: Properties) -> Self {
        self.old_properties = Some(old);
        self
    }

    pub fn with_physical_id(mut self, physical_id: impl Into<String>) -> Self {
        self.physical_id = Some(physical_id.into());
        self
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Non-empty physical id, if any.
    pub fn physical_id(&self) -> Option<&str> {
        self.physical_id.as_deref().filter(|id| !id.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FailureKind {
    ValidationError,
    SecretUnavailable,
    CreationFailed,
    UpdateFailed,
    DeletionFailed,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FailureKind::ValidationError => "ValidationError",
            FailureKind::SecretUnavailable => "SecretUnavailable",
            FailureKind::CreationFailed => "CreationFailed",
            FailureKind::UpdateFailed => "UpdateFailed",
            FailureKind::DeletionFailed => "DeletionFailed",
        };
        f.write_str(name)
    }
}

/// Outcome of one lifecycle invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleResult {
    Success { physical_id: String, data: OutputData },
    Failure { kind: FailureKind, message: String },
}

impl LifecycleResult {
    pub fn success(physical_id: impl Into<String>, data: OutputData) -> Self {
        LifecycleResult::Success { physical_id: physical_id.into(), data }
    }

    pub fn failure(kind: FailureKind, message: impl Into<String>) -> Self {
        LifecycleResult::Failure { kind, message: message.into() }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, LifecycleResult::Success { .. })
    }

    pub fn physical_id(&self) -> Option<&str> {
        match self {
            LifecycleResult::Success { physical_id, .. } => Some(physical_id),
            LifecycleResult::Failure { .. } => None,
        }
    }
}
