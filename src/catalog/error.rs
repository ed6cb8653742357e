use crate::catalog::identity::PatternError;
use thiserror::Error;

/// Defects in a catalog declaration. Raised while the catalog is built, never
/// while resolving a request.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum CatalogError {
    #[error("schema_version '{0}' is not supported")]
    UnsupportedVersion(String),
    #[error("catalog declares no namespaces")]
    Empty,
    #[error("invalid {which} root '{root}'")]
    InvalidRoot { which: &'static str, root: String },
    #[error("invalid namespace '{0}': expected [a-z0-9_]+ without '__'")]
    InvalidNamespace(String),
    #[error("namespace '{0}' declared more than once")]
    DuplicateNamespace(String),
    #[error("namespace '{0}' has no entries")]
    EmptyNamespace(String),
    #[error("namespace '{namespace}': invalid template name '{template}'")]
    InvalidTemplate { namespace: String, template: String },
    #[error("namespace '{namespace}': invalid relative path '{path}'")]
    InvalidPath { namespace: String, path: String },
    #[error("namespace '{namespace}': invalid output pattern '{pattern}': {source}")]
    InvalidPattern {
        namespace: String,
        pattern: String,
        #[source]
        source: PatternError,
    },
    #[error("namespace '{namespace}': more than one entry writes '{output}'")]
    DuplicateOutput { namespace: String, output: String },
}
