//! # Command Line Interface
//!
//! `handle` processes a single lifecycle event, `serve` hosts the adapter over
//! HTTP, and `users` exposes direct user-management operations for operators.

pub mod output;
pub mod users;

use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::adapter::{server, CustomResourceRequest, LifecycleAdapter};
use crate::config::AppConfig;
use crate::controller::LifecycleController;
use crate::observability::{init_logging, log_config_info};
use crate::{APP_NAME, VERSION};

#[derive(Parser)]
#[command(name = "identity-provisioner")]
#[command(about = "Provision identity-platform users and access keys from stack lifecycle events")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging (overrides PROVISIONER_LOG_LEVEL)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Management API base URL override
    #[arg(long, global = true)]
    pub base_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process one lifecycle event and print the response envelope
    Handle {
        /// Event file, or `-` for stdin
        #[arg(short, long, default_value = "-")]
        event: String,

        /// Do not deliver the response to the event's ResponseURL
        #[arg(long)]
        no_send: bool,
    },

    /// Accept lifecycle events over HTTP
    Serve {
        /// Port to bind to
        #[arg(short, long, default_value = "8080")]
        port: u16,

        /// Address to bind to
        #[arg(short, long, default_value = "127.0.0.1")]
        addr: String,
    },

    /// User management commands
    Users {
        #[command(subcommand)]
        command: users::UserCommands,
    },
}

/// Run CLI commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::from_env().context("Failed to load configuration")?;
    if cli.verbose {
        config.observability.log_level = "debug".to_string();
    }
    if let Some(base_url) = cli.base_url {
        config.management.base_url = base_url;
        config.validate()?;
    }

    init_logging(&config.observability)?;
    info!(app_name = APP_NAME, version = VERSION, "Starting identity provisioner");
    log_config_info(&config);

    let controller = LifecycleController::new(config.controller_config(), config.secret_resolver()?)?;

    match cli.command {
        Commands::Handle { event, no_send } => {
            let request = read_event(&event)?;
            let adapter = LifecycleAdapter::new(controller, config.default_resource_kind);
            let response = if no_send { adapter.process(&request).await } else { adapter.handle(&request).await };
            output::print_json(&response)?;
        }
        Commands::Serve { port, addr } => {
            let addr: SocketAddr = format!("{}:{}", addr, port)
                .parse()
                .with_context(|| format!("Invalid bind address {}:{}", addr, port))?;
            let adapter = LifecycleAdapter::new(controller, config.default_resource_kind);
            server::serve(Arc::new(adapter), addr).await?;
        }
        Commands::Users { command } => users::handle_user_command(command, &controller).await?,
    }

    Ok(())
}

/// Read a custom-resource request from a file, or stdin for `-`.
pub fn read_event(source: &str) -> anyhow::Result<CustomResourceRequest> {
    let body = if source == "-" {
        let mut buffer = Vec::new();
        std::io::stdin().read_to_end(&mut buffer).context("Failed to read event from stdin")?;
        buffer
    } else {
        let path: PathBuf = Path::new(source).to_path_buf();
        std::fs::read(&path).with_context(|| format!("Failed to read event file {}", path.display()))?
    };

    Ok(CustomResourceRequest::from_slice(&body)?)
}
