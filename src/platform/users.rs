//! User management operations.

use serde::Serialize;
use serde_json::{json, Value};

use super::{string_at, ManagementApi};
use crate::errors::Result;

pub const CREATE_PATH: &str = "/v1/mgmt/user/create";
pub const LOAD_PATH: &str = "/v1/mgmt/user";
pub const SEARCH_PATH: &str = "/v1/mgmt/user/search";
pub const UPDATE_PATH: &str = "/v1/mgmt/user/update";
pub const STATUS_PATH: &str = "/v1/mgmt/user/update/status";
pub const DELETE_PATH: &str = "/v1/mgmt/user/delete";

/// Body of a user create call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub login_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Body of a user update call. The user is addressed by `login_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub login_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(rename = "name", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Enabled,
    Disabled,
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Enabled => "enabled",
            UserStatus::Disabled => "disabled",
        }
    }
}

impl ManagementApi<'_> {
    pub async fn create_user(&self, user: &NewUser) -> Result<Value> {
        self.post(CREATE_PATH, user).await
    }

    /// Read-only lookup by login id.
    pub async fn load_user(&self, login_id: &str) -> Result<Value> {
        self.get(LOAD_PATH, &[("loginid", login_id)]).await
    }

    pub async fn search_users(&self, limit: u32) -> Result<Value> {
        self.post(SEARCH_PATH, &json!({ "limit": limit })).await
    }

    pub async fn update_user(&self, update: &UserUpdate) -> Result<Value> {
        self.post(UPDATE_PATH, update).await
    }

    pub async fn set_user_status(&self, login_id: &str, status: UserStatus) -> Result<Value> {
        self.post(STATUS_PATH, &json!({ "loginId": login_id, "status": status.as_str() })).await
    }

    pub async fn activate_user(&self, login_id: &str) -> Result<Value> {
        self.set_user_status(login_id, UserStatus::Enabled).await
    }

    pub async fn deactivate_user(&self, login_id: &str) -> Result<Value> {
        self.set_user_status(login_id, UserStatus::Disabled).await
    }

    /// Delete by login id. The platform also accepts the user id here.
    pub async fn delete_user(&self, login_id: &str) -> Result<Value> {
        self.post(DELETE_PATH, &json!({ "loginId": login_id })).await
    }
}

/// Remote user id from a create/load response: `id`, `user.userId` or `user.id`.
pub fn extract_user_id(response: &Value) -> Option<String> {
    string_at(response, "/id")
        .or_else(|| string_at(response, "/user/userId"))
        .or_else(|| string_at(response, "/user/id"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_body_shape() {
        let body = serde_json::to_value(NewUser {
            login_id: "alice".to_string(),
            email: Some("a@example.com".to_string()),
            display_name: None,
        })
        .unwrap();

        assert_eq!(body, json!({"loginId": "alice", "email": "a@example.com"}));
    }

    #[test]
    fn test_update_body_uses_name_for_display_name() {
        let body = serde_json::to_value(UserUpdate {
            login_id: "usr_123".to_string(),
            email: None,
            display_name: Some("Alice".to_string()),
        })
        .unwrap();

        assert_eq!(body, json!({"loginId": "usr_123", "name": "Alice"}));
    }

    #[test]
    fn test_extract_user_id_variants() {
        assert_eq!(extract_user_id(&json!({"id": "usr_123"})).as_deref(), Some("usr_123"));
        assert_eq!(extract_user_id(&json!({"user": {"userId": "U2"}})).as_deref(), Some("U2"));
        assert_eq!(extract_user_id(&json!({"user": {"id": "U3"}})).as_deref(), Some("U3"));
        assert_eq!(extract_user_id(&Value::Null), None);
        assert_eq!(extract_user_id(&json!({"user": {}})), None);
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(UserStatus::Enabled.as_str(), "enabled");
        assert_eq!(UserStatus::Disabled.as_str(), "disabled");
    }
}
