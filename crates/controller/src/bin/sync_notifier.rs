/*
 * Sync Notifier - Controller Service
 * Copyright (C) 2025 Sync Notifier team
 *
 * This program is free software: you can redistribute it and/or modify
 * it under the terms of the GNU Affero General Public License as published
 * by the Free Software Foundation, either version 3 of the License, or
 * (at your option) any later version.
 *
 * This program is distributed in the hope that it will be useful,
 * but WITHOUT ANY WARRANTY; without even the implied warranty of
 * MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
 * GNU Affero General Public License for more details.
 *
 * You should have received a copy of the GNU Affero General Public License
 * along with this program. If not, see <https://www.gnu.org/licenses/>.
 */

//! Controller Service - watches Argo CD `Application` resources
//!
//! This service:
//! - Watches `Application` custom resources for sync and health transitions
//! - Updates the GitHub check run referenced by the application
//! - Optionally comments on pull requests of the synced revision
//! - Provides health and readiness endpoints

use anyhow::Context as _;
use clap::Parser;
use controller::github::GitHubClient;
use controller::{health, run_controller, ControllerConfig};
use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "sync-notifier", version, about = "Forward Argo CD sync status to GitHub")]
struct Args {
    /// Path of the mounted configuration file
    #[arg(long, env = "CONTROLLER_CONFIG_PATH", default_value = "/config/config.yaml")]
    config: String,

    /// Namespace to watch (overrides the configuration file)
    #[arg(long, env = "WATCH_NAMESPACE")]
    namespace: Option<String>,

    /// Port of the health endpoints
    #[arg(long, env = "HEALTH_PORT", default_value_t = 8080)]
    health_port: u16,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into());
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

fn load_controller_config(config_path: &str) -> ControllerConfig {
    if !Path::new(config_path).exists() {
        info!("No configuration file at {}, using defaults", config_path);
        return ControllerConfig::default();
    }

    match ControllerConfig::from_mounted_file(config_path) {
        Ok(cfg) => {
            info!("Loaded controller configuration from {}", config_path);
            cfg
        }
        Err(err) => {
            warn!(
                "Failed to load configuration from {}: {}. Using defaults.",
                config_path, err
            );
            ControllerConfig::default()
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    info!("Starting Sync Notifier v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_controller_config(&args.config);
    if args.namespace.is_some() {
        config.namespace = args.namespace;
    }
    config.validate().context("invalid controller configuration")?;
    let config = Arc::new(config);

    let github = GitHubClient::from_config(&config.github)
        .context("unable to create GitHub client")?;

    let client = kube::Client::try_default()
        .await
        .context("unable to connect to Kubernetes")?;
    info!("Connected to Kubernetes cluster");

    let ready = Arc::new(AtomicBool::new(false));
    let health_handle = tokio::spawn(health::serve(args.health_port, ready.clone()));

    let result = run_controller(client, config, Arc::new(github), ready).await;
    health_handle.abort();

    if let Err(e) = &result {
        error!("Controller error: {}", e);
    }
    result?;

    info!("Sync Notifier stopped");
    Ok(())
}
