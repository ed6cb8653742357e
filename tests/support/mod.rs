#![allow(dead_code)]

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, Request, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dataset_dispatcher::{AppState, Catalog, DispatchError, DispatchGateway, DispatchPayload};
use serde_json::{Value, json};
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::{Arc, Mutex};
use tempfile::NamedTempFile;
use tokio::net::TcpListener;

pub const PROJECT: &str = "orcaanalytics";

/// Path of one of this package's binaries, as built by cargo for the suite.
pub fn helper_binary(name: &str) -> PathBuf {
    let path = match name {
        "resolve-plan" => env!("CARGO_BIN_EXE_resolve-plan"),
        "catalog-check" => env!("CARGO_BIN_EXE_catalog-check"),
        "dispatcher" => env!("CARGO_BIN_EXE_dispatcher"),
        other => panic!("unknown helper binary {other}"),
    };
    PathBuf::from(path)
}

pub fn run_command(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {cmd:?}"))?;
    if output.status.success() {
        Ok(output)
    } else {
        bail!(
            "command {:?} failed: status {:?}\nstdout: {}\nstderr: {}",
            cmd,
            output.status.code(),
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    }
}

/// Run a command that is expected to fail and return its output.
pub fn run_command_failing(mut cmd: Command) -> Result<Output> {
    let output = cmd
        .output()
        .with_context(|| format!("failed to run command: {cmd:?}"))?;
    if output.status.success() {
        bail!(
            "command {:?} unexpectedly succeeded\nstdout: {}",
            cmd,
            String::from_utf8_lossy(&output.stdout)
        );
    }
    Ok(output)
}

/// Gateway that records payloads instead of sending them.
#[derive(Default)]
pub struct RecordingGateway {
    payloads: Mutex<Vec<DispatchPayload>>,
}

impl RecordingGateway {
    pub fn payloads(&self) -> Vec<DispatchPayload> {
        self.payloads
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }
}

#[async_trait]
impl DispatchGateway for RecordingGateway {
    async fn dispatch(&self, payload: &DispatchPayload) -> Result<(), DispatchError> {
        self.payloads
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .push(payload.clone());
        Ok(())
    }
}

/// Gateway that always reports a rejected dispatch.
pub struct RejectingGateway;

#[async_trait]
impl DispatchGateway for RejectingGateway {
    async fn dispatch(&self, _payload: &DispatchPayload) -> Result<(), DispatchError> {
        Err(DispatchError::Rejected {
            status: 404,
            body: "Not Found".to_string(),
        })
    }
}

pub fn builtin_catalog() -> &'static Catalog {
    Catalog::builtin().expect("built-in catalog is valid")
}

pub fn app_state(gateway: Arc<dyn DispatchGateway>) -> AppState {
    AppState::new(Arc::new(builtin_catalog().clone()), PROJECT, gateway)
}

/// Pub/Sub push body wrapping an audit entry for `resource_name`.
pub fn push_body(resource_name: &str) -> Vec<u8> {
    push_body_for_entry(&json!({
        "protoPayload": {
            "methodName": "google.cloud.bigquery.v2.DatasetService.InsertDataset",
            "resourceName": resource_name,
            "authenticationInfo": {"principalEmail": "loader@orcaanalytics.iam.gserviceaccount.com"},
            "resourceLocation": {"currentLocations": ["US"]}
        }
    }))
}

/// Pub/Sub push body whose `data` is the base64 of `entry`.
pub fn push_body_for_entry(entry: &Value) -> Vec<u8> {
    push_body_with_data(&STANDARD.encode(entry.to_string()))
}

pub fn push_body_with_data(data: &str) -> Vec<u8> {
    json!({
        "message": {
            "data": data,
            "messageId": "1234567890",
            "publishTime": "2026-10-19T00:00:00Z"
        },
        "subscription": "projects/orcaanalytics/subscriptions/dataset-created"
    })
    .to_string()
    .into_bytes()
}

pub fn post_root(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header("content-type", "application/json")
        .body(Body::from(body))
        .expect("request builds")
}

pub fn write_catalog(value: &Value) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new().context("failed to allocate catalog file")?;
    serde_json::to_writer_pretty(&mut file, value)?;
    file.flush()?;
    Ok(file)
}

/// A request seen by the fake GitHub API.
#[derive(Clone, Debug)]
pub struct CapturedRequest {
    pub owner: String,
    pub repo: String,
    pub headers: HeaderMap,
    pub body: Value,
}

#[derive(Clone, Default)]
pub struct FakeGitHub {
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl FakeGitHub {
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .clone()
    }
}

/// Start a local stand-in for the GitHub dispatches endpoint that answers
/// every request with `status` and `reply`. Returns its base URL.
pub async fn spawn_fake_github(status: StatusCode, reply: &'static str) -> (String, FakeGitHub) {
    let fake = FakeGitHub::default();
    let app = Router::new()
        .route(
            "/repos/:owner/:repo/dispatches",
            post(
                move |State(fake): State<FakeGitHub>,
                      Path((owner, repo)): Path<(String, String)>,
                      headers: HeaderMap,
                      Json(body): Json<Value>| async move {
                    fake.requests
                        .lock()
                        .unwrap_or_else(|err| err.into_inner())
                        .push(CapturedRequest {
                            owner,
                            repo,
                            headers,
                            body,
                        });
                    (status, reply)
                },
            ),
        )
        .with_state(fake.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake github");
    let addr = listener.local_addr().expect("fake github address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake github serves");
    });
    (format!("http://{addr}"), fake)
}
