//! HTTP surface: Pub/Sub push intake and a health check.
//!
//! `POST /` answers 204 both when a plan was dispatched and when the dataset
//! needs no plan; Pub/Sub treats any 2xx as an ack. Decode and dispatch
//! failures answer 500 so the message is redelivered. Each push runs on its
//! own request task, and the catalog is shared read-only, so a slow dispatch
//! for one dataset does not hold up another.

use crate::catalog::Catalog;
use crate::dispatch::{DispatchError, DispatchGateway, DispatchPayload};
use crate::intake::{IntakeError, PushEnvelope};
use crate::plan::{Unresolved, try_resolve_plan};
use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared, read-only state for every request.
#[derive(Clone)]
pub struct AppState {
    catalog: Arc<Catalog>,
    project: Arc<str>,
    gateway: Arc<dyn DispatchGateway>,
}

impl AppState {
    pub fn new(
        catalog: Arc<Catalog>,
        project: impl Into<Arc<str>>,
        gateway: Arc<dyn DispatchGateway>,
    ) -> Self {
        Self {
            catalog,
            project: project.into(),
            gateway,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}

/// Result of handling one push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventOutcome {
    Skipped {
        dataset_id: String,
        reason: Unresolved,
    },
    Dispatched {
        dataset_id: String,
        files: usize,
    },
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid push envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}

impl EventError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EventError::Envelope(_) => StatusCode::BAD_REQUEST,
            EventError::Intake(_) | EventError::Dispatch(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/", post(push))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until SIGINT/SIGTERM, then drain in-flight requests.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn healthz() -> &'static str {
    "ok"
}

async fn push(State(state): State<AppState>, body: Bytes) -> StatusCode {
    match handle_event(&state, &body).await {
        Ok(_) => StatusCode::NO_CONTENT,
        Err(err) => {
            error!(error = %err, "push handler error");
            err.status_code()
        }
    }
}

/// Decode one push body, resolve its plan, and dispatch it.
pub async fn handle_event(state: &AppState, body: &[u8]) -> Result<EventOutcome, EventError> {
    let envelope: PushEnvelope = if body.iter().all(u8::is_ascii_whitespace) {
        PushEnvelope::default()
    } else {
        serde_json::from_slice(body).map_err(EventError::Envelope)?
    };
    let event = envelope.dataset_event()?;

    info!(
        dataset_id = %event.dataset_id,
        resource_name = %event.resource_name,
        method = ?event.method_name,
        who = ?event.principal_email,
        locations = ?event.locations,
        message_id = ?event.message_id,
        "new dataset event"
    );

    let plan = match try_resolve_plan(&state.catalog, &event.dataset_id, &state.project) {
        Ok(plan) => plan,
        Err(reason) => {
            info!(dataset_id = %event.dataset_id, %reason, "no matching template plan");
            return Ok(EventOutcome::Skipped {
                dataset_id: event.dataset_id,
                reason,
            });
        }
    };

    let files = plan.len();
    let payload = DispatchPayload::from(plan);
    state.gateway.dispatch(&payload).await?;
    info!(dataset_id = %payload.dataset_id, files, "dispatched build plan");

    Ok(EventOutcome::Dispatched {
        dataset_id: payload.dataset_id,
        files,
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
