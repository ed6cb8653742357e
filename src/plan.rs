//! Build-plan resolution.
//!
//! `resolve_plan` turns a dataset id into the ordered list of template →
//! model files the CI job must write, plus the variables it renders them
//! with. Resolution is a pure function of the identifier, the project id, and
//! the catalog: the same inputs always give the same plan, byte for byte, since
//! the CI job treats the plan as the literal list of files to write.

use crate::catalog::{Catalog, CatalogEntry};
use crate::identifier::split_dataset_id;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One template to instantiate and where its output goes.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct FileMapping {
    #[serde(rename = "template")]
    pub template_path: String,
    #[serde(rename = "path")]
    pub output_path: String,
}

/// Variables handed to the template renderer.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct PlanVars {
    #[serde(rename = "datasetId")]
    pub dataset_id: String,
    pub parent: String,
    pub client: String,
    pub project: String,
}

/// Resolved plan for a single dataset.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BuildPlan {
    pub files: Vec<FileMapping>,
    pub vars: PlanVars,
}

impl BuildPlan {
    pub fn dataset_id(&self) -> &str {
        &self.vars.dataset_id
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Why an identifier produced no plan. Neither case is an error: the dataset
/// is simply not one the catalog generates models for.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Unresolved {
    /// The identifier is not `<namespace>__<tenant>`.
    UnrecognizedIdentifier,
    /// The identifier split, but the catalog has no such namespace.
    UnknownNamespace(String),
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::UnrecognizedIdentifier => {
                f.write_str("identifier is not <namespace>__<tenant>")
            }
            Unresolved::UnknownNamespace(namespace) => {
                write!(f, "namespace '{namespace}' is not in the catalog")
            }
        }
    }
}

/// Resolve `dataset_id`, or `None` when no plan applies.
pub fn resolve_plan(catalog: &Catalog, dataset_id: &str, project: &str) -> Option<BuildPlan> {
    try_resolve_plan(catalog, dataset_id, project).ok()
}

/// Like [`resolve_plan`], but says why no plan applies.
pub fn try_resolve_plan(
    catalog: &Catalog,
    dataset_id: &str,
    project: &str,
) -> Result<BuildPlan, Unresolved> {
    let id = split_dataset_id(dataset_id).ok_or(Unresolved::UnrecognizedIdentifier)?;
    let namespace = id.namespace();
    let tenant = id.tenant();
    let entries = catalog
        .lookup(namespace)
        .ok_or_else(|| Unresolved::UnknownNamespace(namespace.to_string()))?;

    let files = entries
        .iter()
        .map(|entry| file_mapping(catalog, namespace, tenant, entry))
        .collect();

    Ok(BuildPlan {
        files,
        vars: PlanVars {
            dataset_id: dataset_id.to_string(),
            parent: namespace.to_string(),
            client: tenant.to_string(),
            project: project.to_string(),
        },
    })
}

fn file_mapping(
    catalog: &Catalog,
    namespace: &str,
    tenant: &str,
    entry: &CatalogEntry,
) -> FileMapping {
    FileMapping {
        template_path: join_path(
            catalog.templates_root(),
            namespace,
            entry.relative_path(),
            &entry.template_file(),
        ),
        output_path: join_path(
            catalog.models_root(),
            namespace,
            entry.relative_path(),
            &entry.output_name(tenant),
        ),
    }
}

/// `<root>/<namespace>/[<relative>/]<file>` with forward slashes regardless of
/// host platform; these are repository paths, not local ones.
fn join_path(root: &str, namespace: &str, relative: &str, file: &str) -> String {
    let mut path =
        String::with_capacity(root.len() + namespace.len() + relative.len() + file.len() + 3);
    path.push_str(root);
    path.push('/');
    path.push_str(namespace);
    path.push('/');
    if !relative.is_empty() {
        path.push_str(relative);
        path.push('/');
    }
    path.push_str(file);
    path
}
