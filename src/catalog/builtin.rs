//! The catalog compiled into the dispatcher.
//!
//! One row per generated model. Rows keep their declared order because the
//! build plan lists files in exactly this order.

use crate::catalog::error::CatalogError;
use crate::catalog::identity::{NamePattern, Namespace, OutputNaming, TemplateName};
use crate::catalog::model::{CatalogDocument, EntrySpec, NamespaceSpec};

struct NamespaceDef {
    name: &'static str,
    entries: &'static [EntryDef],
}

struct EntryDef {
    path: &'static str,
    template: &'static str,
    output: Option<&'static str>,
}

const fn standard(path: &'static str, template: &'static str) -> EntryDef {
    EntryDef {
        path,
        template,
        output: None,
    }
}

const fn renamed(path: &'static str, template: &'static str, output: &'static str) -> EntryDef {
    EntryDef {
        path,
        template,
        output: Some(output),
    }
}

const fn root(template: &'static str) -> EntryDef {
    standard("", template)
}

const BUILTIN: &[NamespaceDef] = &[
    NamespaceDef {
        name: "facebook_ads",
        entries: &[
            standard("campaigns", "facebook_ads"),
            standard("creative", "facebook_ads_creative"),
        ],
    },
    NamespaceDef {
        name: "google_ads",
        entries: &[
            standard("campaigns", "google_ads"),
            standard("keywords", "google_ads_keywords"),
            standard("products", "google_ads_products"),
        ],
    },
    NamespaceDef {
        name: "google_analytics_4",
        entries: &[renamed(
            "sessionscvr",
            "google_analytics_4_sessionscvr",
            "google_analytics_4__{tenant}_sessionscvr.sql",
        )],
    },
    NamespaceDef {
        name: "shareasale",
        entries: &[renamed(
            "shareasale_weeklyprogress",
            "shareasale_weeklyprogressreport",
            "shareasale__{tenant}_weeklyprogressreport.sql",
        )],
    },
    NamespaceDef {
        name: "shopify",
        entries: &[
            // Subscription cohorts keep their pre-convention model names.
            renamed(
                "cohort_subscription",
                "shopify_cohort_otptosub",
                "shopify_cohort__{tenant}_otptosub.sql",
            ),
            renamed(
                "cohort_subscription",
                "shopify_cohort_subfirstpurchase",
                "shopify_cohort__{tenant}_subfirstpurchase.sql",
            ),
            standard("cohort", "shopify_cohort"),
            standard("newreturn", "shopify_newreturn"),
            standard("orders", "shopify_orders"),
            standard("product_firstbasket", "shopify_product_firstbasket"),
            standard("product_firstsecondorder", "shopify_product_firstsecondorder"),
            standard("product_ltr_journey", "shopify_product_ltrjourney"),
            standard("product_ltr", "shopify_product_ltr"),
            standard("product", "shopify_products"),
            standard("refunds", "shopify_refunds"),
            standard("shopify_pixel/base_customervisits", "shopify_customervisits"),
            standard("shopify_pixel/daily_channel", "shopify_pixel_dailychannel"),
            standard("shopify_pixel/extrapolated", "shopify_pixel_extrapolated"),
            standard("shopify_pixel/modeled", "shopify_pixel_modeled"),
            standard("shopify_pixel/percent_of_orders", "shopify_pixel_percentoforders"),
        ],
    },
    NamespaceDef {
        name: "amazon",
        entries: &[
            standard("amazon_ads", "amazon_ads"),
            standard("amazon_sellercentral", "amazon_sellercentral"),
        ],
    },
    NamespaceDef {
        name: "applovin",
        entries: &[root("applovin")],
    },
    NamespaceDef {
        name: "bing_ads",
        entries: &[root("bing_ads")],
    },
    NamespaceDef {
        name: "pinterest_ads",
        entries: &[root("pinterest_ads")],
    },
    NamespaceDef {
        name: "snapchat_ads",
        entries: &[root("snapchat_ads")],
    },
    NamespaceDef {
        name: "tiktok_ads",
        entries: &[
            standard("campaigns", "tiktok_ads"),
            standard("creative", "tiktok_ads_creative"),
        ],
    },
    NamespaceDef {
        name: "hdyhau_fairing",
        entries: &[root("fairing_hdyhau")],
    },
    NamespaceDef {
        name: "hdyhau_knocommerce",
        entries: &[
            standard("all_responses", "knocommerce_allresponses"),
            standard("hdyhau", "knocommerce_hdyhau"),
        ],
    },
    NamespaceDef {
        name: "klaviyo",
        entries: &[
            standard("leadgen_sms", "klaviyo_leadgen_sms"),
            standard("leadgen", "klaviyo_leadgen"),
        ],
    },
    NamespaceDef {
        name: "liveintent",
        entries: &[root("liveintent")],
    },
    NamespaceDef {
        name: "pacing",
        entries: &[root("pacing")],
    },
    NamespaceDef {
        name: "rakuten",
        entries: &[root("rakuten")],
    },
    NamespaceDef {
        name: "twitter_ads",
        entries: &[root("twitter_ads")],
    },
];

/// Expand the compiled-in table into a catalog document.
pub(crate) fn builtin_document() -> Result<CatalogDocument, CatalogError> {
    let mut document = CatalogDocument::new();
    for ns in BUILTIN {
        let mut entries = Vec::with_capacity(ns.entries.len());
        for entry in ns.entries {
            let output = match entry.output {
                None => OutputNaming::Default,
                Some(raw) => NamePattern::parse(raw)
                    .map(OutputNaming::Custom)
                    .map_err(|source| CatalogError::InvalidPattern {
                        namespace: ns.name.to_string(),
                        pattern: raw.to_string(),
                        source,
                    })?,
            };
            entries.push(EntrySpec {
                path: entry.path.to_string(),
                template: TemplateName(entry.template.to_string()),
                output,
            });
        }
        document.namespaces.push(NamespaceSpec {
            name: Namespace(ns.name.to_string()),
            entries,
        });
    }
    Ok(document)
}
