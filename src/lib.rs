//! Shared library for the dataset dispatcher.
//!
//! A BigQuery dataset named `<namespace>__<tenant>` (say
//! `shopify__acmewidgets`) triggers generation of that tenant's dbt models.
//! The crate splits the dataset id, expands the namespace against the
//! generation catalog into an ordered build plan, and relays the plan to the
//! dbt repository as a GitHub `repository_dispatch` event. Resolution is pure
//! and lives in `identifier`, `catalog`, and `plan`; `intake`, `dispatch`, and
//! `server` are the I/O around it.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_subscriber::EnvFilter;

pub mod catalog;
pub mod config;
pub mod dispatch;
pub mod identifier;
pub mod intake;
pub mod plan;
pub mod schema_loader;
pub mod server;

pub use catalog::{
    Catalog, CatalogDocument, CatalogEntry, CatalogError, NamePattern, Namespace, OutputNaming,
    TemplateName, load_catalog_from_path,
};
pub use config::{ConfigError, DispatcherConfig, GitHubSettings};
pub use dispatch::{
    DATASET_CREATED_EVENT, DispatchError, DispatchGateway, DispatchPayload, GitHubDispatcher,
};
pub use identifier::{DatasetIdentifier, split_dataset_id};
pub use intake::{DatasetEvent, IntakeError, PushEnvelope};
pub use plan::{BuildPlan, FileMapping, PlanVars, Unresolved, resolve_plan, try_resolve_plan};
pub use server::{AppState, EventError, EventOutcome, handle_event, router, serve};

/// Log filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "dataset_dispatcher=info,dispatcher=info,tower_http=info";

/// Install the global `tracing` subscriber.
///
/// Honors `RUST_LOG`; falls back to [`DEFAULT_LOG_FILTER`].
pub fn init_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// The catalog the process should serve: `path` when given, else the
/// compiled-in table.
///
/// Any defect is returned here so callers can fail at startup rather than on
/// the first request.
pub fn load_catalog(path: Option<&Path>) -> Result<Catalog> {
    match path {
        Some(path) => Catalog::load(path),
        None => Catalog::builtin()
            .cloned()
            .context("built-in catalog is invalid"),
    }
}
