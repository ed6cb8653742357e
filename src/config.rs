//! Environment-driven service configuration.
//!
//! Everything is read once at startup. `from_lookup` takes the variable source
//! as a closure so tests can supply a map instead of mutating the process
//! environment.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GITHUB_OWNER: &str = "ORCA-Analytics";
pub const DEFAULT_GITHUB_REPO: &str = "orca-dbt";
pub const DEFAULT_PROJECT: &str = "orcaanalytics";
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("invalid {var}: '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Target repository and credentials for repository dispatches.
#[derive(Clone)]
pub struct GitHubSettings {
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub token: String,
    pub timeout: Duration,
}

impl fmt::Debug for GitHubSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubSettings")
            .field("api_url", &self.api_url)
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct DispatcherConfig {
    pub port: u16,
    /// Project id placed in every plan's variables.
    pub project: String,
    /// Catalog file replacing the compiled-in table.
    pub catalog_path: Option<PathBuf>,
    pub github: GitHubSettings,
}

impl DispatcherConfig {
    /// Read configuration from the process environment (and `.env`, if any).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::Invalid {
                var: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        let timeout = match var("DISPATCH_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        var: "DISPATCH_TIMEOUT_SECS",
                        value: raw,
                    });
                }
            },
            None => DEFAULT_DISPATCH_TIMEOUT,
        };

        let token = var("GITHUB_TOKEN").ok_or(ConfigError::Missing("GITHUB_TOKEN"))?;

        Ok(Self {
            port,
            project: var("PROJECT").unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
            catalog_path: var("CATALOG_PATH").map(PathBuf::from),
            github: GitHubSettings {
                api_url: var("GITHUB_API_URL")
                    .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
                owner: var("GH_OWNER").unwrap_or_else(|| DEFAULT_GITHUB_OWNER.to_string()),
                repo: var("GH_REPO").unwrap_or_else(|| DEFAULT_GITHUB_REPO.to_string()),
                token,
                timeout,
            },
        })
    }
}
