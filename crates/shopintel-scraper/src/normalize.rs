//! Conversion from raw `products.json` shapes to [`shopintel_core::Product`].

use std::collections::BTreeSet;

use shopintel_core::{Product, Variant};

use crate::html::clean_text;
use crate::types::{RawProduct, RawVariant, TagField};

/// Normalizes either tag shape to a set of trimmed, lower-cased tags.
///
/// List items are split on commas too, so re-normalizing a joined result
/// yields the same set.
#[must_use]
pub fn normalize_tags(tags: &TagField) -> BTreeSet<String> {
    let pieces: Box<dyn Iterator<Item = &str>> = match tags {
        TagField::Delimited(s) => Box::new(s.split(',')),
        TagField::List(items) => Box::new(items.iter().flat_map(|item| item.split(','))),
    };
    pieces
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Converts one decoded catalog entry. Returns `None` when the id is blank.
#[must_use]
pub fn normalize_product(raw: RawProduct) -> Option<Product> {
    let id = raw.id.normalized()?;

    let description = raw
        .body_html
        .as_deref()
        .map(clean_text)
        .filter(|s| !s.is_empty());

    Some(Product {
        title: raw
            .title
            .map(|t| t.trim().to_owned())
            .unwrap_or_default(),
        handle: non_blank(raw.handle),
        vendor: non_blank(raw.vendor),
        product_type: non_blank(raw.product_type),
        description,
        tags: raw.tags.as_ref().map(normalize_tags).unwrap_or_default(),
        variants: raw.variants.into_iter().map(normalize_variant).collect(),
        images: raw.images.into_iter().map(|i| i.src).collect(),
        category: None,
        id,
    })
}

fn normalize_variant(raw: RawVariant) -> Variant {
    Variant {
        id: raw.id.and_then(|id| id.normalized()),
        title: raw
            .title
            .map(|t| t.trim().to_owned())
            .unwrap_or_default(),
        price: raw.price.and_then(|p| p.normalized()),
        compare_at_price: raw.compare_at_price.and_then(|p| p.normalized()),
        sku: non_blank(raw.sku),
        available: raw.available,
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
