//! Access key lifecycle handlers.
//!
//! Keys cannot be modified in place; an Update is reported as a failure so the
//! template author replaces the resource instead.

use reqwest::Method;
use tracing::{info, warn};

use super::classify::ErrorKind;
use super::properties::AccessKeyProperties;
use super::types::{FailureKind, LifecycleEvent, LifecycleResult, OutputData, RequestType};
use super::{failure_for, require_physical_id, LifecycleController};
use crate::errors::{Error, Result};
use crate::platform::access_keys::{extract_access_key, CREATE_PATH};
use crate::platform::ManagementApi;

pub const CLIENT_ID_OUTPUT: &str = "ClientId";
pub const ACCESS_KEY_ID_OUTPUT: &str = "AccessKeyId";

impl LifecycleController {
    pub(super) async fn handle_access_key(&self, event: &LifecycleEvent) -> LifecycleResult {
        match event.request_type {
            RequestType::Create => self
                .create_access_key(event)
                .await
                .unwrap_or_else(|e| failure_for(&e, FailureKind::CreationFailed)),
            RequestType::Update => LifecycleResult::failure(
                FailureKind::UpdateFailed,
                "Access keys cannot be updated in place; rename the resource to replace the key",
            ),
            RequestType::Delete => self
                .delete_access_key(event)
                .await
                .unwrap_or_else(|e| failure_for(&e, FailureKind::DeletionFailed)),
        }
    }

    async fn create_access_key(&self, event: &LifecycleEvent) -> Result<LifecycleResult> {
        let key = AccessKeyProperties::from_properties(&event.properties)?;
        let refs = self.credential_refs(&event.properties)?;

        let credentials = self.resolve_credentials(&refs).await?;
        let api = ManagementApi::new(self.client(), &credentials)?;

        match api.create_access_key(&key.to_new_access_key()).await {
            Ok(response) => {
                let created = extract_access_key(&response)
                    .ok_or_else(|| Error::internal("Access key create response carried no key id"))?;
                info!(name = %key.name, access_key_id = %created.id, "Access key created");

                let mut data = OutputData::new();
                if let Some(client_id) = created.client_id {
                    data.insert(CLIENT_ID_OUTPUT.to_string(), client_id);
                }
                data.insert(ACCESS_KEY_ID_OUTPUT.to_string(), created.id.clone());
                Ok(LifecycleResult::success(created.id, data))
            }
            Err(e) if self.classify(&e) == ErrorKind::AlreadyExists => {
                // Keys have no natural key; only an id the platform issued earlier can be bound.
                let Some(physical_id) = event.physical_id() else {
                    warn!(name = %key.name, "Access key already exists and no key id is bound");
                    return Err(Error::remote_api(
                        &Method::POST,
                        CREATE_PATH,
                        e.status().unwrap_or_default(),
                        format!(
                            "access key '{}' already exists but no previously issued key id is known",
                            key.name
                        ),
                    ));
                };
                info!(name = %key.name, physical_id = %physical_id, "Access key already exists");

                let data = OutputData::from([(ACCESS_KEY_ID_OUTPUT.to_string(), physical_id.to_string())]);
                Ok(LifecycleResult::success(physical_id, data))
            }
            Err(e) => Err(e),
        }
    }

    async fn delete_access_key(&self, event: &LifecycleEvent) -> Result<LifecycleResult> {
        let physical_id = require_physical_id(event)?;
        let refs = self.credential_refs(&event.properties)?;

        let credentials = self.resolve_credentials(&refs).await?;
        let api = ManagementApi::new(self.client(), &credentials)?;

        match api.delete_access_key(physical_id).await {
            Ok(_) => info!(physical_id = %physical_id, "Access key deleted"),
            Err(e) if self.classify(&e) == ErrorKind::NotFound => {
                info!(physical_id = %physical_id, "Access key already absent")
            }
            Err(e) => return Err(e),
        }

        Ok(LifecycleResult::success(physical_id, OutputData::new()))
    }
}
