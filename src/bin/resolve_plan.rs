//! Print the build plan a dataset id would dispatch, without dispatching it.
//!
//! Useful when adding catalog entries: the output is the exact
//! `client_payload` the CI workflow would receive, or the reason there is no
//! plan.

use anyhow::{Context, Result, bail};
use dataset_dispatcher::config::DEFAULT_PROJECT;
use dataset_dispatcher::{DispatchPayload, load_catalog, try_resolve_plan};
use serde_json::json;
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse()?;
    let catalog = load_catalog(cli.catalog.as_deref())?;

    let output = match try_resolve_plan(&catalog, &cli.dataset_id, &cli.project) {
        Ok(plan) => serde_json::to_value(DispatchPayload::from(plan)).context("serializing plan")?,
        Err(reason) => json!({
            "datasetId": cli.dataset_id,
            "plan": null,
            "reason": reason.to_string(),
        }),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("serializing output")?
    );
    Ok(())
}

struct Cli {
    dataset_id: String,
    project: String,
    catalog: Option<PathBuf>,
}

impl Cli {
    fn parse() -> Result<Self> {
        let mut args = env::args().skip(1);
        let mut dataset_id = None;
        let mut project = None;
        let mut catalog = None;

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--project" | "-p" => {
                    project = Some(args.next().context("--project requires a value")?);
                }
                "--catalog" | "-c" => {
                    catalog = Some(PathBuf::from(
                        args.next().context("--catalog requires a path")?,
                    ));
                }
                "--help" | "-h" => usage(0),
                other if other.starts_with('-') => bail!("unknown flag: {other}"),
                other => {
                    if dataset_id.replace(other.to_string()).is_some() {
                        bail!("expected a single dataset id");
                    }
                }
            }
        }

        let Some(dataset_id) = dataset_id else {
            usage(1);
        };
        Ok(Self {
            dataset_id,
            project: project.unwrap_or_else(|| DEFAULT_PROJECT.to_string()),
            catalog,
        })
    }
}

fn usage(code: i32) -> ! {
    eprintln!(
        "Usage: resolve-plan <dataset-id> [--project <id>] [--catalog <file>]\n\nPrints the repository-dispatch payload for <dataset-id> as JSON.\n\nExamples:\n  resolve-plan shopify__acmewidgets\n  resolve-plan facebook_ads__clientone --project staging --catalog catalog.json"
    );
    std::process::exit(code);
}
