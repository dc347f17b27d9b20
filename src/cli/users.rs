//! Operator commands against the user-management API.
//!
//! Credentials come from the configured project id and secret reference.

use clap::Subcommand;
use serde_json::{json, Value};

use super::output::print_json;
use crate::controller::{LifecycleController, Properties};
use crate::platform::ManagementApi;

#[derive(Subcommand)]
pub enum UserCommands {
    /// Load a user by login id
    Get {
        /// Login id (the user id is accepted too)
        login_id: String,
    },

    /// List users
    Search {
        /// Maximum number of users to return
        #[arg(long, default_value = "10")]
        limit: u32,
    },

    /// Enable a user
    Enable { login_id: String },

    /// Disable a user
    Disable { login_id: String },
}

pub async fn handle_user_command(command: UserCommands, controller: &LifecycleController) -> anyhow::Result<()> {
    let credentials = controller.credentials(&Properties::new()).await?;
    let api = ManagementApi::new(controller.client(), &credentials)?;

    let result: Value = match command {
        UserCommands::Get { login_id } => api.load_user(&login_id).await?,
        UserCommands::Search { limit } => api.search_users(limit).await?,
        UserCommands::Enable { login_id } => {
            api.activate_user(&login_id).await?;
            json!({"message": "User enabled", "loginId": login_id})
        }
        UserCommands::Disable { login_id } => {
            api.deactivate_user(&login_id).await?;
            json!({"message": "User disabled", "loginId": login_id})
        }
    };

    print_json(&result)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::controller::test_support::MapResolver;
    use crate::controller::ControllerConfig;

    fn controller(server: &MockServer) -> LifecycleController {
        LifecycleController::new(
            ControllerConfig {
                project_id: Some("P1".to_string()),
                secret_name: Some("/mgmt/key".to_string()),
                base_url: server.uri(),
                ..Default::default()
            },
            Arc::new(MapResolver::with("/mgmt/key", "K1")),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_disable_user() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/mgmt/user/update/status"))
            .and(header("authorization", "Bearer P1:K1"))
            .and(body_json(json!({"loginId": "alice", "status": "disabled"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"user": {}})))
            .expect(1)
            .mount(&server)
            .await;

        handle_user_command(UserCommands::Disable { login_id: "alice".to_string() }, &controller(&server))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_search_users() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/mgmt/user/search"))
            .and(body_json(json!({"limit": 5})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
            .expect(1)
            .mount(&server)
            .await;

        handle_user_command(UserCommands::Search { limit: 5 }, &controller(&server)).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_before_any_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST")).respond_with(ResponseTemplate::new(200)).expect(0).mount(&server).await;

        let controller = LifecycleController::new(
            ControllerConfig { base_url: server.uri(), ..Default::default() },
            Arc::new(MapResolver::default()),
        )
        .unwrap();

        assert!(handle_user_command(UserCommands::Enable { login_id: "alice".to_string() }, &controller)
            .await
            .is_err());
    }
}
