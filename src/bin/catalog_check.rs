//! Validate a catalog file (or the built-in table) and summarize it.
//!
//! Runs the same checks the service runs at startup, so a catalog that passes
//! here will not keep the dispatcher from booting.

use anyhow::{Result, bail};
use dataset_dispatcher::{Catalog, load_catalog};
use std::env;
use std::path::PathBuf;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let path = parse_args()?;
    let catalog = load_catalog(path.as_deref())?;
    print!("{}", render_summary(&catalog));
    Ok(())
}

fn parse_args() -> Result<Option<PathBuf>> {
    let mut args = env::args().skip(1);
    let first = args.next();
    if args.next().is_some() {
        bail!("expected at most one catalog path");
    }
    match first.as_deref() {
        Some("--help" | "-h") => {
            eprintln!(
                "Usage: catalog-check [catalog.json]\n\nValidates the catalog and lists namespaces with their entry counts.\nWithout a path, checks the built-in catalog."
            );
            std::process::exit(0);
        }
        Some(other) if other.starts_with('-') => bail!("unknown flag: {other}"),
        Some(path) => Ok(Some(PathBuf::from(path))),
        None => Ok(None),
    }
}

fn render_summary(catalog: &Catalog) -> String {
    let width = catalog
        .namespaces()
        .map(|ns| ns.as_str().len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    let mut total = 0;
    for (namespace, entries) in catalog.iter() {
        let custom = entries
            .iter()
            .filter(|entry| entry.naming().pattern().is_some())
            .count();
        total += entries.len();
        out.push_str(&format!(
            "{:width$}  {:>2} entries{}\n",
            namespace.as_str(),
            entries.len(),
            if custom > 0 {
                format!(" ({custom} custom names)")
            } else {
                String::new()
            },
            width = width
        ));
    }
    out.push_str(&format!(
        "catalog ok: {} namespaces, {} entries (templates: {}, models: {})\n",
        catalog.len(),
        total,
        catalog.templates_root(),
        catalog.models_root()
    ));
    out
}
