//! Deserializable representation of a catalog document.
//!
//! The built-in table and JSON catalog files both produce a
//! `CatalogDocument`; `Catalog::from_document` then validates it and builds
//! the lookup structure. Use these structs when the raw declaration matters
//! (authoring, linting); use `Catalog` for resolution.

use crate::catalog::identity::{Namespace, OutputNaming, TemplateName};
use crate::schema_loader::validate_catalog_value;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

/// Schema version accepted for catalog documents.
pub const CATALOG_SCHEMA_VERSION: &str = "dataset_catalog_v1";

/// Directory that holds the SQL templates, relative to the dbt repository.
pub const DEFAULT_TEMPLATES_ROOT: &str = "templates";

/// Directory the generated models are written to.
pub const DEFAULT_MODELS_ROOT: &str = "models";

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Full catalog as declared, before validation.
pub struct CatalogDocument {
    pub schema_version: String,
    #[serde(default = "default_templates_root")]
    pub templates_root: String,
    #[serde(default = "default_models_root")]
    pub models_root: String,
    pub namespaces: Vec<NamespaceSpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
/// One namespace and its entries, in declared order.
pub struct NamespaceSpec {
    pub name: Namespace,
    pub entries: Vec<EntrySpec>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
/// Declared generation entry.
pub struct EntrySpec {
    /// Directory under the namespace; empty for the namespace root.
    #[serde(default)]
    pub path: String,
    pub template: TemplateName,
    /// Output-name pattern; omitted or `null` means default naming.
    #[serde(default, skip_serializing_if = "is_default_naming")]
    pub output: OutputNaming,
}

fn default_templates_root() -> String {
    DEFAULT_TEMPLATES_ROOT.to_string()
}

fn default_models_root() -> String {
    DEFAULT_MODELS_ROOT.to_string()
}

fn is_default_naming(naming: &OutputNaming) -> bool {
    matches!(naming, OutputNaming::Default)
}

impl CatalogDocument {
    /// Empty document with default roots.
    pub fn new() -> Self {
        Self {
            schema_version: CATALOG_SCHEMA_VERSION.to_string(),
            templates_root: default_templates_root(),
            models_root: default_models_root(),
            namespaces: Vec::new(),
        }
    }
}

impl Default for CatalogDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Read a catalog document from disk, checking it against the catalog schema.
///
/// Only the document shape is checked here; naming rules, duplicates, and
/// path hygiene are enforced by `Catalog::from_document`.
pub fn load_catalog_from_path(path: &Path) -> Result<CatalogDocument> {
    let data =
        fs::read_to_string(path).with_context(|| format!("reading catalog {}", path.display()))?;
    let value: Value = serde_json::from_str(&data)
        .with_context(|| format!("parsing catalog {}", path.display()))?;
    validate_catalog_value(&value)
        .with_context(|| format!("validating catalog {}", path.display()))?;
    let document: CatalogDocument = serde_json::from_value(value)
        .with_context(|| format!("decoding catalog {}", path.display()))?;
    Ok(document)
}
