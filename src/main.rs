// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::Result;
use futures::future::try_join_all;
use kube::Client;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use secretsync::config::Config;
use secretsync::kubernetes::LeaseLock;
use secretsync::reconcilers::registrations;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing, RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting secretsync operator");

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: watch_namespace={}, error_requeue={:?}",
        config.watch_namespace.as_deref().unwrap_or("<all>"),
        config.error_requeue
    );

    // Create Kubernetes client
    let client = Client::try_default().await?;
    info!("Connected to Kubernetes cluster");

    let controllers = registrations().into_iter().map(|registration| {
        info!("Registering {} controller", registration.kind);
        (registration.start)(client.clone(), config.clone())
    });

    match config.leader_election.clone() {
        Some(settings) => {
            // Only the lease holder reconciles; losing the lease stops the process
            let lock = LeaseLock::new(client.clone(), settings);
            lock.acquire().await?;
            tokio::try_join!(lock.hold(), try_join_all(controllers))?;
        }
        None => {
            info!("Leader election disabled");
            try_join_all(controllers).await?;
        }
    }

    // Controllers run until their watch streams end
    warn!("All controllers stopped unexpectedly");
    Ok(())
}
