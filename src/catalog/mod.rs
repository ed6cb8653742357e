//! Generation catalog wiring.
//!
//! The catalog maps a data-source namespace to the ordered templates that must
//! be instantiated for every tenant of that source. The table compiled into the
//! binary is the default; a JSON document checked against
//! `schema/catalog.schema.json` can replace it at startup. Callers resolve
//! through `Catalog`; the `model` types describe the raw declaration.

mod builtin;
pub mod error;
pub mod identity;
pub mod index;
pub mod model;

pub use error::CatalogError;
pub use identity::{NamePattern, Namespace, OutputNaming, PatternError, TemplateName};
pub use index::{Catalog, CatalogEntry};
pub use model::{
    CATALOG_SCHEMA_VERSION, CatalogDocument, DEFAULT_MODELS_ROOT, DEFAULT_TEMPLATES_ROOT,
    EntrySpec, NamespaceSpec,
};

pub use model::load_catalog_from_path;
