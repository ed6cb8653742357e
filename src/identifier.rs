//! Splits dataset identifiers of the form `<namespace>__<tenant>`.
//!
//! The scan is explicit rather than pattern-engine driven: the separator is the
//! leftmost `__` that leaves a non-empty namespace on its left and a non-empty
//! tenant on its right, and both halves must consist of identifier characters
//! only. Catalog construction rejects namespace names containing `__`, so a
//! known namespace can never be split in the wrong place.

/// Separator between the namespace and tenant halves of a dataset id.
pub const SEPARATOR: &str = "__";

/// Identifier split into its namespace (`parent`) and tenant (`client`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct DatasetIdentifier<'a> {
    raw: &'a str,
    namespace: &'a str,
    tenant: &'a str,
}

impl<'a> DatasetIdentifier<'a> {
    /// Parse `raw`, returning `None` when it does not split cleanly.
    pub fn parse(raw: &'a str) -> Option<Self> {
        split_dataset_id(raw)
    }

    /// The identifier exactly as received.
    pub fn as_str(&self) -> &'a str {
        self.raw
    }

    pub fn namespace(&self) -> &'a str {
        self.namespace
    }

    pub fn tenant(&self) -> &'a str {
        self.tenant
    }
}

/// Split a dataset identifier into namespace and tenant.
///
/// Returns `None` for anything that is not `<namespace>__<tenant>`: missing
/// separator, empty halves, or characters outside the allowed classes. The
/// namespace is not checked against any catalog here.
pub fn split_dataset_id(raw: &str) -> Option<DatasetIdentifier<'_>> {
    let bytes = raw.as_bytes();
    let sep = SEPARATOR.as_bytes();

    // Start at 1 and stop early enough that both halves stay non-empty.
    let last_start = bytes.len().checked_sub(sep.len() + 1)?;
    let at = (1..=last_start).find(|&idx| &bytes[idx..idx + sep.len()] == sep)?;

    let namespace = &raw[..at];
    let tenant = &raw[at + sep.len()..];
    if !namespace.bytes().all(is_namespace_byte) || !tenant.bytes().all(is_tenant_byte) {
        return None;
    }

    Some(DatasetIdentifier {
        raw,
        namespace,
        tenant,
    })
}

/// Namespace characters: `[a-z0-9_]`.
pub fn is_namespace_byte(b: u8) -> bool {
    b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_'
}

/// Tenant characters: `[A-Za-z0-9_]`. Dataset ids are case-sensitive, so the
/// tenant keeps whatever case the dataset was created with.
pub fn is_tenant_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// True when `name` is usable as a catalog namespace key.
pub fn is_valid_namespace(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(is_namespace_byte) && !name.contains(SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts(raw: &str) -> Option<(&str, &str)> {
        split_dataset_id(raw).map(|id| (id.namespace(), id.tenant()))
    }

    #[test]
    fn splits_simple_identifier() {
        assert_eq!(parts("shopify__acmewidgets"), Some(("shopify", "acmewidgets")));
        assert_eq!(
            parts("google_analytics_4__storeA"),
            Some(("google_analytics_4", "storeA"))
        );
    }

    #[test]
    fn keeps_raw_identifier() {
        let id = DatasetIdentifier::parse("klaviyo__brand_1").expect("splits");
        assert_eq!(id.as_str(), "klaviyo__brand_1");
    }

    #[test]
    fn leftmost_separator_wins() {
        assert_eq!(parts("shopify__acme__eu"), Some(("shopify", "acme__eu")));
        assert_eq!(parts("a___b"), Some(("a", "_b")));
    }

    #[test]
    fn separator_at_edges_is_skipped() {
        // Leading `__` would leave an empty namespace; the next candidate is used.
        assert_eq!(parts("__x__y"), Some(("__x", "y")));
        assert_eq!(parts("__x"), None);
        assert_eq!(parts("shopify__"), None);
        assert_eq!(parts("__"), None);
    }

    #[test]
    fn rejects_malformed_input() {
        for raw in [
            "",
            "_",
            "missingSeparator",
            "shopify_acme",
            "Shopify__acme",
            "shopify__ac-me",
            "shop ify__acme",
            "shopify__acmé",
            "shopify__acme.eu",
        ] {
            assert_eq!(split_dataset_id(raw), None, "{raw:?} should not split");
        }
    }

    #[test]
    fn namespace_key_rules() {
        assert!(is_valid_namespace("google_analytics_4"));
        assert!(!is_valid_namespace(""));
        assert!(!is_valid_namespace("double__under"));
        assert!(!is_valid_namespace("Upper"));
    }
}
