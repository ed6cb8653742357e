//! Hands resolved plans to the CI system.
//!
//! [`DispatchGateway`] is the seam the service depends on; [`GitHubDispatcher`]
//! implements it with a `repository_dispatch` call that a workflow in the dbt
//! repository listens for.

use crate::config::GitHubSettings;
use crate::plan::{BuildPlan, FileMapping, PlanVars};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// `event_type` the CI workflow is triggered by.
pub const DATASET_CREATED_EVENT: &str = "bq_dataset_created";

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const GITHUB_API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("dataset-dispatcher/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("dispatch request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("GitHub dispatch failed: {status} {body}")]
    Rejected { status: u16, body: String },
}

/// `client_payload` of the dispatch event.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct DispatchPayload {
    #[serde(rename = "datasetId")]
    pub dataset_id: String,
    pub files: Vec<FileMapping>,
    pub vars: PlanVars,
}

impl From<BuildPlan> for DispatchPayload {
    fn from(plan: BuildPlan) -> Self {
        Self {
            dataset_id: plan.vars.dataset_id.clone(),
            files: plan.files,
            vars: plan.vars,
        }
    }
}

#[derive(Debug, Serialize)]
struct DispatchRequest<'a> {
    event_type: &'a str,
    client_payload: &'a DispatchPayload,
}

/// Relays a resolved plan to the remote build system.
#[async_trait]
pub trait DispatchGateway: Send + Sync {
    async fn dispatch(&self, payload: &DispatchPayload) -> Result<(), DispatchError>;
}

/// Sends `repository_dispatch` events to a GitHub repository.
#[derive(Clone)]
pub struct GitHubDispatcher {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl GitHubDispatcher {
    pub fn new(settings: &GitHubSettings) -> Result<Self, DispatchError> {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            endpoint: dispatches_url(&settings.api_url, &settings.owner, &settings.repo),
            token: settings.token.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DispatchGateway for GitHubDispatcher {
    async fn dispatch(&self, payload: &DispatchPayload) -> Result<(), DispatchError> {
        let body = DispatchRequest {
            event_type: DATASET_CREATED_EVENT,
            client_payload: payload,
        };
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .header(reqwest::header::ACCEPT, GITHUB_ACCEPT)
            .header("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(
                dataset_id = %payload.dataset_id,
                status = status.as_u16(),
                "repository dispatch accepted"
            );
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(DispatchError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

fn dispatches_url(api_url: &str, owner: &str, repo: &str) -> String {
    format!(
        "{}/repos/{}/{}/dispatches",
        api_url.trim_end_matches('/'),
        owner,
        repo
    )
}
