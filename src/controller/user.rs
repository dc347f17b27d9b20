//! User lifecycle handlers.

use tracing::{info, warn};

use super::classify::ErrorKind;
use super::properties::{lookup, UserProperties, LOGIN_ID_KEYS};
use super::types::{FailureKind, LifecycleEvent, LifecycleResult, OutputData, RequestType};
use super::{failure_for, require_physical_id, LifecycleController};
use crate::errors::{Error, Result};
use crate::platform::users::extract_user_id;
use crate::platform::ManagementApi;

/// Output attribute carrying the login id.
pub const USER_NAME_OUTPUT: &str = "userName";

fn outputs(user: &UserProperties) -> OutputData {
    OutputData::from([(USER_NAME_OUTPUT.to_string(), user.login_id.clone())])
}

impl LifecycleController {
    pub(super) async fn handle_user(&self, event: &LifecycleEvent) -> LifecycleResult {
        match event.request_type {
            RequestType::Create => self
                .create_user(event)
                .await
                .unwrap_or_else(|e| failure_for(&e, FailureKind::CreationFailed)),
            RequestType::Update => self
                .update_user(event)
                .await
                .unwrap_or_else(|e| failure_for(&e, FailureKind::UpdateFailed)),
            RequestType::Delete => self
                .delete_user(event)
                .await
                .unwrap_or_else(|e| failure_for(&e, FailureKind::DeletionFailed)),
        }
    }

    async fn create_user(&self, event: &LifecycleEvent) -> Result<LifecycleResult> {
        let user = UserProperties::from_properties(&event.properties)?;
        let refs = self.credential_refs(&event.properties)?;

        let credentials = self.resolve_credentials(&refs).await?;
        let api = ManagementApi::new(self.client(), &credentials)?;

        match api.create_user(&user.to_new_user()).await {
            Ok(response) => {
                let physical_id = extract_user_id(&response).unwrap_or_else(|| user.login_id.clone());
                info!(login_id = %user.login_id, physical_id = %physical_id, "User created");
                Ok(LifecycleResult::success(physical_id, outputs(&user)))
            }
            // 2xx with an unreadable body: the user exists remotely.
            Err(e @ Error::Serialization { .. }) => {
                warn!(login_id = %user.login_id, error = %e, "User created but response was unreadable");
                Ok(LifecycleResult::success(user.login_id.clone(), outputs(&user)))
            }
            Err(e) if self.classify(&e) == ErrorKind::AlreadyExists => {
                info!(login_id = %user.login_id, "User already exists, binding existing identity");

                // Read-only; a failed lookup falls back to the ids we already know.
                let existing = match api.load_user(&user.login_id).await {
                    Ok(response) => extract_user_id(&response),
                    Err(load_error) => {
                        warn!(login_id = %user.login_id, error = %load_error, "Could not load existing user");
                        None
                    }
                };

                let physical_id = existing
                    .or_else(|| event.physical_id().map(str::to_string))
                    .unwrap_or_else(|| user.login_id.clone());
                Ok(LifecycleResult::success(physical_id, outputs(&user)))
            }
            Err(e) => Err(e),
        }
    }

    async fn update_user(&self, event: &LifecycleEvent) -> Result<LifecycleResult> {
        let physical_id = require_physical_id(event)?;
        let user = UserProperties::from_properties(&event.properties)?;

        if let Some(previous) = event.old_properties.as_ref().and_then(|old| lookup(old, LOGIN_ID_KEYS)) {
            if previous != user.login_id {
                return Err(Error::unsupported(format!(
                    "Changing loginId from '{}' to '{}' requires replacing the resource",
                    previous, user.login_id
                )));
            }
        }

        let refs = self.credential_refs(&event.properties)?;
        let credentials = self.resolve_credentials(&refs).await?;
        let api = ManagementApi::new(self.client(), &credentials)?;

        api.update_user(&user.to_update(physical_id)).await?;
        info!(physical_id = %physical_id, "User updated");

        Ok(LifecycleResult::success(physical_id, outputs(&user)))
    }

    async fn delete_user(&self, event: &LifecycleEvent) -> Result<LifecycleResult> {
        let physical_id = require_physical_id(event)?;
        let refs = self.credential_refs(&event.properties)?;

        let credentials = self.resolve_credentials(&refs).await?;
        let api = ManagementApi::new(self.client(), &credentials)?;

        match api.delete_user(physical_id).await {
            Ok(_) => {
                info!(physical_id = %physical_id, "User deleted");
            }
            Err(e) if self.classify(&e) == ErrorKind::NotFound => {
                info!(physical_id = %physical_id, "User already absent");
            }
            Err(e) => return Err(e),
        }

        Ok(LifecycleResult::success(physical_id, OutputData::new()))
    }
}
