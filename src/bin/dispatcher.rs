//! Dataset dispatcher service.
//!
//! Listens for Pub/Sub pushes of BigQuery dataset-creation audit entries and
//! forwards the resolved build plan to GitHub. Configuration comes from the
//! environment (see `DispatcherConfig`); the catalog is validated before the
//! listener binds so a bad catalog keeps the revision from becoming ready.

use anyhow::{Context, Result};
use dataset_dispatcher::{
    AppState, DispatcherConfig, GitHubDispatcher, init_logging, load_catalog, serve,
};
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

#[tokio::main]
async fn main() {
    // `.env` may carry RUST_LOG, so it is read before the subscriber exists.
    dotenvy::dotenv().ok();
    init_logging();
    if let Err(err) = run().await {
        tracing::error!("{err:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = DispatcherConfig::from_env().context("loading configuration")?;

    let catalog = load_catalog(config.catalog_path.as_deref())?;
    info!(
        namespaces = catalog.len(),
        source = %config
            .catalog_path
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "built-in".to_string()),
        "catalog ready"
    );

    let gateway = GitHubDispatcher::new(&config.github).context("building GitHub client")?;
    info!(
        endpoint = gateway.endpoint(),
        project = %config.project,
        "dispatch target"
    );

    let state = AppState::new(Arc::new(catalog), config.project.clone(), Arc::new(gateway));

    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "listening");

    serve(listener, state).await.context("server error")
}
