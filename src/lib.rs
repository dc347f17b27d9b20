//! # Identity Provisioner
//!
//! Provisions and deprovisions identities (users and API access keys) in an
//! external identity-management platform as side effects of infrastructure
//! stack lifecycle events.
//!
//! ## Architecture
//!
//! ```text
//! orchestrator → LifecycleAdapter → LifecycleController → { SecretResolver, ApiClient } → platform
//!                      ↑                                                                     │
//!                      └──────────────────────── response envelope ◄─────────────────────────┘
//! ```
//!
//! ## Core Components
//!
//! - **Secret Resolver**: fetches the management key from the local side-channel
//! - **Resilient API Client**: authenticated HTTP with bounded, policy-driven retry
//! - **Lifecycle Controller**: idempotent Create/Update/Delete state machine
//! - **Lifecycle Adapter**: custom-resource envelope translation and response delivery
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use identity_provisioner::controller::{LifecycleController, LifecycleEvent, Properties, ResourceKind};
//! use identity_provisioner::{AppConfig, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = AppConfig::from_env()?;
//!     let controller = LifecycleController::new(config.controller_config(), config.secret_resolver()?)?;
//!
//!     let mut properties = Properties::new();
//!     properties.insert("loginId".to_string(), "alice".to_string());
//!     let result = controller.handle(&LifecycleEvent::create(ResourceKind::User, properties)).await;
//!     println!("{:?}", result);
//!     Ok(())
//! }
//! ```

pub mod adapter;
pub mod cli;
pub mod config;
pub mod controller;
pub mod errors;
pub mod observability;
pub mod platform;
pub mod remote;
pub mod secrets;

pub use config::AppConfig;
pub use errors::{Error, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
