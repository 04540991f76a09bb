use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use shopintel_core::FailureReason;

use super::{ExtractOptions, ExtractorOutcome, Signal};
use crate::fetch::Fetcher;
use crate::html::{json_ld_blocks, meta_content, page_text};
use crate::normalize::normalize_product;
use crate::types::RawProduct;

/// Shopify's maximum page size for `products.json`.
const PAGE_SIZE: usize = 250;

/// Hard stop for stores that never return an empty page.
const MAX_PAGES: usize = 50;

const CURRENCY_META_KEYS: &[&str] = &[
    "og:price:currency",
    "product:price:currency",
    "priceCurrency",
    "currency",
];

/// Price-text markers, most specific first. Bare `$` is the last resort.
const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("C$", "CAD"),
    ("A$", "AUD"),
    ("S$", "SGD"),
    ("R$", "BRL"),
    ("€", "EUR"),
    ("£", "GBP"),
    ("₹", "INR"),
    ("₩", "KRW"),
    ("฿", "THB"),
    ("₱", "PHP"),
    ("₫", "VND"),
    ("$", "USD"),
];

static SHOPIFY_CURRENCY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)Shopify\.currency\s*=\s*\{[^}]*?["']active["']\s*:\s*["']([a-z]{3})["']"#)
        .expect("valid regex")
});

pub(super) async fn extract(fetcher: &Fetcher, options: &ExtractOptions) -> ExtractorOutcome {
    let mut products = Vec::new();
    let mut skipped = 0usize;
    let mut interrupted = false;

    for page in 1..=MAX_PAGES {
        let path = format!("/products.json?limit={PAGE_SIZE}&page={page}");
        let entries = match fetcher.fetch_json(&path).await {
            Ok(body) => match page_entries(body) {
                Some(entries) => entries,
                None if page == 1 => {
                    return ExtractorOutcome::Failed(FailureReason::CatalogUnavailable {
                        detail: "response has no products array".to_owned(),
                    });
                }
                None => {
                    tracing::warn!(page, "catalog page has unexpected shape; stopping");
                    interrupted = true;
                    break;
                }
            },
            Err(e) if page == 1 => {
                return ExtractorOutcome::Failed(FailureReason::CatalogUnavailable {
                    detail: e.to_string(),
                });
            }
            Err(e) => {
                tracing::warn!(page, error = %e, "catalog page failed; keeping earlier pages");
                interrupted = true;
                break;
            }
        };

        if entries.is_empty() {
            break;
        }

        for entry in entries {
            match serde_json::from_value::<RawProduct>(entry) {
                Ok(raw) => match normalize_product(raw) {
                    Some(product) => products.push(product),
                    None => skipped += 1,
                },
                Err(e) => {
                    tracing::debug!(page, error = %e, "skipping malformed catalog entry");
                    skipped += 1;
                }
            }
        }

        if products.len() >= options.max_products {
            products.truncate(options.max_products);
            break;
        }

        if page == MAX_PAGES {
            tracing::warn!(
                max_pages = MAX_PAGES,
                products = products.len(),
                "catalog page cap reached; keeping gathered products"
            );
        }
    }

    let currency = match fetcher.fetch_html("/").await {
        Ok(html) => detect_currency(&html),
        Err(e) => {
            tracing::debug!(error = %e, "homepage unavailable for currency detection");
            None
        }
    };

    let signal = Signal::Catalog { products, currency };
    if skipped > 0 || interrupted {
        ExtractorOutcome::PartiallySucceeded { signal, skipped }
    } else {
        ExtractorOutcome::Succeeded(signal)
    }
}

/// Takes ownership of the `products` array, if the body has one.
fn page_entries(body: Value) -> Option<Vec<Value>> {
    match body {
        Value::Object(mut map) => match map.remove("products") {
            Some(Value::Array(entries)) => Some(entries),
            _ => None,
        },
        _ => None,
    }
}

/// ISO 4217 code the storefront prices in.
///
/// Checked in order: price meta tags, JSON-LD `priceCurrency`, the theme's
/// `Shopify.currency` script, then currency symbols in the page text.
pub(super) fn detect_currency(html: &str) -> Option<String> {
    CURRENCY_META_KEYS
        .iter()
        .find_map(|key| meta_content(html, key).as_deref().and_then(currency_code))
        .or_else(|| {
            json_ld_blocks(html)
                .iter()
                .find_map(|block| price_currency(block, 0))
        })
        .or_else(|| {
            SHOPIFY_CURRENCY_RE
                .captures(html)
                .and_then(|cap| currency_code(cap.get(1)?.as_str()))
        })
        .or_else(|| {
            let text = page_text(html);
            CURRENCY_SYMBOLS
                .iter()
                .find(|(symbol, _)| text.contains(symbol))
                .map(|(_, code)| (*code).to_owned())
        })
}

fn currency_code(raw: &str) -> Option<String> {
    let raw = raw.trim();
    (raw.len() == 3 && raw.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| raw.to_ascii_uppercase())
}

/// First `priceCurrency` anywhere in a JSON-LD value (`offers`, `@graph`,
/// nested arrays).
fn price_currency(value: &Value, depth: usize) -> Option<String> {
    if depth > 8 {
        return None;
    }
    match value {
        Value::Object(map) => map
            .get("priceCurrency")
            .and_then(Value::as_str)
            .and_then(currency_code)
            .or_else(|| map.values().find_map(|v| price_currency(v, depth + 1))),
        Value::Array(items) => items.iter().find_map(|v| price_currency(v, depth + 1)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn currency_from_meta_tag_wins() {
        let html = r#"<head><meta property="og:price:currency" content="cad"></head>
            <body>Only $20</body>"#;
        assert_eq!(detect_currency(html).as_deref(), Some("CAD"));
    }

    #[test]
    fn currency_from_json_ld_offers() {
        let html = r#"<script type="application/ld+json">
            {"@graph": [{"@type": "Product", "offers": [{"price": "10", "priceCurrency": "gbp"}]}]}
            </script>"#;
        assert_eq!(detect_currency(html).as_deref(), Some("GBP"));
    }

    #[test]
    fn currency_from_shopify_script() {
        let html = r#"<script>Shopify.currency = {"active":"AUD","rate":"1.0"};</script>"#;
        assert_eq!(detect_currency(html).as_deref(), Some("AUD"));
    }

    #[test]
    fn currency_from_symbols_prefers_specific_markers() {
        assert_eq!(
            detect_currency("<body><p>From C$45.00</p></body>").as_deref(),
            Some("CAD")
        );
        assert_eq!(
            detect_currency("<body><p>€25,00</p></body>").as_deref(),
            Some("EUR")
        );
        assert!(detect_currency("<body><p>Welcome</p></body>").is_none());
    }

    #[test]
    fn page_entries_requires_products_array() {
        assert_eq!(
            page_entries(json!({"products": [{"id": 1}]})).map(|e| e.len()),
            Some(1)
        );
        assert!(page_entries(json!({"products": {}})).is_none());
        assert!(page_entries(json!([1, 2])).is_none());
    }
}
