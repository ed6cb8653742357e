//! Validated, immutable catalog used for plan resolution.
//!
//! Construction is strict: anything that could make resolution ambiguous or
//! produce colliding files is rejected up front, so a catalog that builds can
//! serve every request without further checks.

use crate::catalog::builtin::builtin_document;
use crate::catalog::error::CatalogError;
use crate::catalog::identity::{Namespace, OutputNaming, TemplateName};
use crate::catalog::model::{
    CATALOG_SCHEMA_VERSION, CatalogDocument, EntrySpec, NamespaceSpec, load_catalog_from_path,
};
use crate::identifier::{is_tenant_byte, is_valid_namespace};
use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::LazyLock;

// Tenant used to render output names when checking for collisions, alongside
// any tenant for which two single-placeholder names coincide.
const SAMPLE_TENANT: &str = "tenant";

static BUILTIN_CATALOG: LazyLock<Result<Catalog, CatalogError>> =
    LazyLock::new(|| builtin_document().and_then(Catalog::from_document));

/// One generated file for a namespace.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CatalogEntry {
    relative_path: String,
    template: TemplateName,
    naming: OutputNaming,
}

impl CatalogEntry {
    /// Directory under the namespace; empty when the entry lives at its root.
    pub fn relative_path(&self) -> &str {
        &self.relative_path
    }

    pub fn template(&self) -> &TemplateName {
        &self.template
    }

    pub fn naming(&self) -> &OutputNaming {
        &self.naming
    }

    /// Template file name, e.g. `shopify_orders.sql`.
    pub fn template_file(&self) -> String {
        format!("{}.sql", self.template.as_str())
    }

    /// Output file name for `tenant`.
    pub fn output_name(&self, tenant: &str) -> String {
        self.naming.output_name(&self.template, tenant)
    }
}

/// Namespace → ordered entries, plus the template and model roots.
#[derive(Clone, Debug)]
pub struct Catalog {
    templates_root: String,
    models_root: String,
    namespaces: BTreeMap<Namespace, Vec<CatalogEntry>>,
}

impl Catalog {
    /// The compiled-in catalog, validated once per process.
    pub fn builtin() -> Result<&'static Catalog, CatalogError> {
        BUILTIN_CATALOG.as_ref().map_err(Clone::clone)
    }

    /// Load, schema-check, and validate a catalog file.
    pub fn load(path: &Path) -> Result<Self> {
        let document = load_catalog_from_path(path)?;
        Catalog::from_document(document)
            .with_context(|| format!("building catalog from {}", path.display()))
    }

    /// Validate a document and build the lookup table.
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        if document.schema_version != CATALOG_SCHEMA_VERSION {
            return Err(CatalogError::UnsupportedVersion(document.schema_version));
        }
        validate_root("templates", &document.templates_root)?;
        validate_root("models", &document.models_root)?;
        if document.namespaces.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut namespaces = BTreeMap::new();
        for spec in document.namespaces {
            let NamespaceSpec { name, entries } = spec;
            if !is_valid_namespace(name.as_str()) {
                return Err(CatalogError::InvalidNamespace(name.0));
            }
            if namespaces.contains_key(&name) {
                return Err(CatalogError::DuplicateNamespace(name.0));
            }
            let entries = build_entries(&name, entries)?;
            namespaces.insert(name, entries);
        }

        Ok(Self {
            templates_root: document.templates_root,
            models_root: document.models_root,
            namespaces,
        })
    }

    /// Entries for `namespace`, in declared order. Exact match only.
    pub fn lookup(&self, namespace: &str) -> Option<&[CatalogEntry]> {
        self.namespaces.get(namespace).map(Vec::as_slice)
    }

    pub fn contains(&self, namespace: &str) -> bool {
        self.namespaces.contains_key(namespace)
    }

    /// Namespaces in stable (sorted) order.
    pub fn namespaces(&self) -> impl Iterator<Item = &Namespace> {
        self.namespaces.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Namespace, &[CatalogEntry])> {
        self.namespaces
            .iter()
            .map(|(name, entries)| (name, entries.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.namespaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.namespaces.is_empty()
    }

    pub fn templates_root(&self) -> &str {
        &self.templates_root
    }

    pub fn models_root(&self) -> &str {
        &self.models_root
    }
}

fn build_entries(
    namespace: &Namespace,
    specs: Vec<EntrySpec>,
) -> Result<Vec<CatalogEntry>, CatalogError> {
    if specs.is_empty() {
        return Err(CatalogError::EmptyNamespace(namespace.0.clone()));
    }

    let mut entries = Vec::with_capacity(specs.len());
    for spec in specs {
        let EntrySpec {
            path,
            template,
            output,
        } = spec;
        if template.0.is_empty() || !template.0.bytes().all(is_tenant_byte) {
            return Err(CatalogError::InvalidTemplate {
                namespace: namespace.0.clone(),
                template: template.0,
            });
        }
        if !path.is_empty() && !is_clean_relative(&path) {
            return Err(CatalogError::InvalidPath {
                namespace: namespace.0.clone(),
                path,
            });
        }

        entries.push(CatalogEntry {
            relative_path: path,
            template,
            naming: output,
        });
    }
    check_outputs(namespace, &entries)?;
    Ok(entries)
}

fn check_outputs(namespace: &Namespace, entries: &[CatalogEntry]) -> Result<(), CatalogError> {
    let mut tenants = vec![SAMPLE_TENANT.to_string()];
    for (i, first) in entries.iter().enumerate() {
        for second in &entries[i + 1..] {
            if first.relative_path == second.relative_path {
                tenants.extend(colliding_tenant(first, second));
            }
        }
    }

    for tenant in &tenants {
        let mut outputs = BTreeSet::new();
        for entry in entries {
            let rendered = if entry.relative_path.is_empty() {
                entry.output_name(tenant)
            } else {
                format!("{}/{}", entry.relative_path, entry.output_name(tenant))
            };
            if !outputs.insert(rendered.clone()) {
                return Err(CatalogError::DuplicateOutput {
                    namespace: namespace.0.clone(),
                    output: rendered,
                });
            }
        }
    }
    Ok(())
}

/// A tenant for which both entries render the same file name, if one exists.
///
/// With names `p1 t s1` and `p2 t s2` where `p2 = p1 u` and `s1 = v s2`, the
/// names agree exactly when `t v = u t`, which holds iff `u = x y`, `v = y x`
/// and `t` is `x` (or `u` when `x` is empty). Names that repeat the tenant are
/// only checked with the sample tenant.
fn colliding_tenant(first: &CatalogEntry, second: &CatalogEntry) -> Option<String> {
    let a = first.naming.tenant_affixes(&first.template)?;
    let b = second.naming.tenant_affixes(&second.template)?;
    let ((p1, s1), (p2, s2)) = if a.0.len() <= b.0.len() { (a, b) } else { (b, a) };
    if p1.len() + s1.len() != p2.len() + s2.len() {
        return None;
    }
    let u = p2.strip_prefix(p1.as_str())?;
    let v = s1.strip_suffix(s2.as_str())?;
    if u.is_empty() {
        return None;
    }
    (0..u.len())
        .filter(|&at| u.is_char_boundary(at))
        .filter_map(|at| {
            let (x, y) = u.split_at(at);
            (v.starts_with(y) && v.ends_with(x))
                .then(|| if x.is_empty() { u } else { x })
        })
        .find(|tenant| tenant.bytes().all(is_tenant_byte))
        .map(str::to_string)
}

fn validate_root(which: &'static str, root: &str) -> Result<(), CatalogError> {
    if is_clean_relative(root) {
        Ok(())
    } else {
        Err(CatalogError::InvalidRoot {
            which,
            root: root.to_string(),
        })
    }
}

/// `a/b/c` style path: no empty, `.`, or `..` segments and no surrounding `/`.
fn is_clean_relative(path: &str) -> bool {
    !path.is_empty()
        && path.split('/').all(|segment| {
            !segment.is_empty()
                && segment != "."
                && segment != ".."
                && segment
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
        })
}
