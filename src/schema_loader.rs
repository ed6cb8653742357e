//! JSON Schema validation for catalog documents.
//!
//! The schema ships inside the binary (`schema/catalog.schema.json`) so a
//! deployed dispatcher can check a catalog file without the source tree. It is
//! compiled once on first use.

use anyhow::{Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::sync::LazyLock;

const CATALOG_SCHEMA_JSON: &str = include_str!("../schema/catalog.schema.json");

static CATALOG_SCHEMA: LazyLock<Result<Value, String>> = LazyLock::new(|| {
    serde_json::from_str(CATALOG_SCHEMA_JSON).map_err(|err| format!("parsing catalog schema: {err}"))
});

static COMPILED_CATALOG_SCHEMA: LazyLock<Result<JSONSchema, String>> = LazyLock::new(|| {
    let schema = CATALOG_SCHEMA.as_ref().map_err(Clone::clone)?;
    JSONSchema::compile(schema).map_err(|err| format!("compiling catalog schema: {err}"))
});

/// The embedded catalog schema as JSON.
pub fn catalog_schema() -> Result<&'static Value> {
    CATALOG_SCHEMA.as_ref().map_err(|err| anyhow!(err.clone()))
}

/// Validate `value` against the catalog schema, reporting every violation.
pub(crate) fn validate_catalog_value(value: &Value) -> Result<()> {
    let compiled = COMPILED_CATALOG_SCHEMA
        .as_ref()
        .map_err(|err| anyhow!(err.clone()))?;

    if let Err(errors) = compiled.validate(value) {
        let details = errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        bail!("catalog failed schema validation:\n{}", details);
    }
    Ok(())
}
