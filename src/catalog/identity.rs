use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;
use thiserror::Error;

/// Data-source category a dataset belongs to (e.g., `shopify`).
///
/// Namespaces key the catalog and form the `parent` half of a dataset id.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespace(pub String);

/// Logical template name, without the `.sql` extension.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateName(pub String);

impl Namespace {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Namespace {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TemplateName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How an entry names the file it generates for a tenant.
///
/// `Default` yields `<template>__<tenant>.sql`; `Custom` carries a parsed
/// pattern for entries whose models predate that convention.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub enum OutputNaming {
    #[default]
    Default,
    Custom(NamePattern),
}

impl OutputNaming {
    /// Render the output file name for `tenant`.
    pub fn output_name(&self, template: &TemplateName, tenant: &str) -> String {
        match self {
            OutputNaming::Default => format!("{}__{}.sql", template.as_str(), tenant),
            OutputNaming::Custom(pattern) => pattern.render(template.as_str(), tenant),
        }
    }

    /// Text before and after the tenant in the output name, when the tenant
    /// appears exactly once.
    pub fn tenant_affixes(&self, template: &TemplateName) -> Option<(String, String)> {
        match self {
            OutputNaming::Default => Some((format!("{}__", template.as_str()), ".sql".to_string())),
            OutputNaming::Custom(pattern) => pattern.tenant_affixes(template.as_str()),
        }
    }

    /// The raw pattern text, or `None` for default naming.
    pub fn pattern(&self) -> Option<&str> {
        match self {
            OutputNaming::Default => None,
            OutputNaming::Custom(pattern) => Some(pattern.as_str()),
        }
    }
}

impl Serialize for OutputNaming {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self.pattern() {
            Some(raw) => serializer.serialize_some(raw),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for OutputNaming {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        match value {
            None => Ok(OutputNaming::Default),
            Some(raw) => NamePattern::parse(&raw)
                .map(OutputNaming::Custom)
                .map_err(serde::de::Error::custom),
        }
    }
}

const TEMPLATE_PLACEHOLDER: &str = "template";
const TENANT_PLACEHOLDER: &str = "tenant";

#[derive(Clone, Debug, Eq, PartialEq)]
enum Segment {
    Literal(String),
    Template,
    Tenant,
}

/// Output-name pattern such as `shopify_cohort__{tenant}_otptosub.sql`.
///
/// Supports `{template}` and `{tenant}` placeholders. Patterns are parsed once
/// when the catalog is built, so rendering is infallible.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NamePattern {
    raw: String,
    segments: Vec<Segment>,
}

/// Reasons a naming pattern is rejected.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum PatternError {
    #[error("pattern is empty")]
    Empty,
    #[error("unterminated placeholder")]
    Unterminated,
    #[error("unknown placeholder {{{0}}}")]
    UnknownPlaceholder(String),
    #[error("pattern must reference {{tenant}}")]
    MissingTenant,
    #[error("pattern must end in .sql")]
    NotSql,
    #[error("pattern must be a file name, not a path")]
    ContainsSeparator,
}

impl NamePattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if raw.is_empty() {
            return Err(PatternError::Empty);
        }
        if raw.contains('/') {
            return Err(PatternError::ContainsSeparator);
        }
        if !raw.ends_with(".sql") {
            return Err(PatternError::NotSql);
        }

        let mut segments = Vec::new();
        let mut rest = raw;
        while let Some(open) = rest.find('{') {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after = &rest[open + 1..];
            let close = after.find('}').ok_or(PatternError::Unterminated)?;
            segments.push(match &after[..close] {
                TEMPLATE_PLACEHOLDER => Segment::Template,
                TENANT_PLACEHOLDER => Segment::Tenant,
                other => return Err(PatternError::UnknownPlaceholder(other.to_string())),
            });
            rest = &after[close + 1..];
        }
        if rest.contains('}') {
            return Err(PatternError::Unterminated);
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        if !segments.contains(&Segment::Tenant) {
            return Err(PatternError::MissingTenant);
        }

        Ok(Self {
            raw: raw.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    fn tenant_affixes(&self, template: &str) -> Option<(String, String)> {
        let mut tenants = self.segments.iter().filter(|s| **s == Segment::Tenant);
        if tenants.next().is_none() || tenants.next().is_some() {
            return None;
        }
        let rendered = self.render(template, "");
        let at: usize = self
            .segments
            .iter()
            .take_while(|s| **s != Segment::Tenant)
            .map(|segment| match segment {
                Segment::Literal(text) => text.len(),
                Segment::Template => template.len(),
                Segment::Tenant => 0,
            })
            .sum();
        let (prefix, suffix) = rendered.split_at(at);
        Some((prefix.to_string(), suffix.to_string()))
    }

    pub fn render(&self, template: &str, tenant: &str) -> String {
        let mut out = String::with_capacity(self.raw.len() + tenant.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Template => out.push_str(template),
                Segment::Tenant => out.push_str(tenant),
            }
        }
        out
    }
}
