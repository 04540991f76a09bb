//! Applies a [`TextStructurer`] to an aggregated insights record.

use std::collections::HashSet;

use shopintel_core::BrandInsights;

use crate::structurer::TextStructurer;
use crate::types::{FieldKey, StructureRequest, StructuredItem, TextItem};

/// Maximum characters sent per text item.
pub const MAX_ITEM_CHARS: usize = 2_000;
/// Maximum characters sent per request, across all items.
pub const MAX_REQUEST_CHARS: usize = 12_000;

const SCHEMA_HINT: [&str; 2] = ["text", "category"];

/// Collects the free text of `insights` into a bounded request.
///
/// Items are added brand context first, then policies, then each product's
/// title and description. Title items carry the product type and tags as
/// context. Returns the request together with the keys whose
/// text had to be cut short.
#[must_use]
pub fn build_request(insights: &BrandInsights) -> (StructureRequest, HashSet<FieldKey>) {
    let mut sources: Vec<(FieldKey, &str, Vec<String>)> = Vec::new();
    if let Some(context) = insights.brand_context.as_deref() {
        sources.push((FieldKey::BrandContext, context, Vec::new()));
    }
    for policy in &insights.policies {
        sources.push((
            FieldKey::PolicyBody { kind: policy.kind },
            policy.body.as_str(),
            Vec::new(),
        ));
    }
    for product in &insights.products {
        let hints = product
            .product_type
            .iter()
            .chain(product.tags.iter())
            .cloned()
            .collect();
        sources.push((
            FieldKey::ProductTitle {
                product_id: product.id.clone(),
            },
            product.title.as_str(),
            hints,
        ));
        if let Some(description) = product.description.as_deref() {
            sources.push((
                FieldKey::ProductDescription {
                    product_id: product.id.clone(),
                },
                description,
                Vec::new(),
            ));
        }
    }

    let mut items = Vec::new();
    let mut truncated = HashSet::new();
    let mut remaining = MAX_REQUEST_CHARS;
    for (key, text, context) in sources {
        if remaining == 0 {
            break;
        }
        if text.trim().is_empty() {
            continue;
        }
        let limit = remaining.min(MAX_ITEM_CHARS);
        let len = text.chars().count();
        let text = if len > limit {
            truncated.insert(key.clone());
            text.chars().take(limit).collect()
        } else {
            text.to_owned()
        };
        remaining -= text.chars().count();
        items.push(TextItem { key, text, context });
    }

    let request = StructureRequest {
        items,
        schema_hint: SCHEMA_HINT.iter().map(|s| (*s).to_owned()).collect(),
    };
    (request, truncated)
}

/// Runs `insights` through `structurer` and merges the results.
///
/// Collaborator failures are never fatal: the record comes back unchanged
/// apart from `normalization_skipped = true`.
pub async fn normalize(insights: BrandInsights, structurer: &dyn TextStructurer) -> BrandInsights {
    let (request, truncated) = build_request(&insights);
    if request.is_empty() {
        return insights;
    }

    let requested: HashSet<FieldKey> = request.items.iter().map(|i| i.key.clone()).collect();
    let item_count = request.items.len();

    match structurer.structure(request).await {
        Ok(response) => {
            let mut out = insights;
            let mut applied = 0_usize;
            for item in response.items {
                if !requested.contains(&item.key) {
                    tracing::debug!(key = ?item.key, "ignoring unrequested structured item");
                    continue;
                }
                let keep_text = truncated.contains(&item.key);
                if apply_item(&mut out, item, keep_text) {
                    applied += 1;
                }
            }
            tracing::info!(
                store = %out.target,
                requested = item_count,
                applied,
                "normalized brand insights"
            );
            out
        }
        Err(e) => {
            tracing::warn!(
                store = %insights.target,
                error = %e,
                "text structurer failed; keeping raw insights"
            );
            let mut out = insights;
            out.normalization_skipped = true;
            out
        }
    }
}

/// Merges one item. Returns whether anything changed.
///
/// For keys whose request text was truncated only the category is applied.
fn apply_item(insights: &mut BrandInsights, item: StructuredItem, keep_text: bool) -> bool {
    let text = item
        .text
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty() && !keep_text);
    let category = item
        .category
        .map(|c| c.trim().to_lowercase())
        .filter(|c| !c.is_empty());

    match item.key {
        FieldKey::BrandContext => replace_text(&mut insights.brand_context, text),
        FieldKey::PolicyBody { kind } => {
            let Some(policy) = insights.policies.iter_mut().find(|p| p.kind == kind) else {
                return false;
            };
            match text {
                Some(text) if text != policy.body => {
                    policy.body = text;
                    true
                }
                _ => false,
            }
        }
        FieldKey::ProductTitle { product_id } => {
            let Some(product) = insights.products.iter_mut().find(|p| p.id == product_id) else {
                return false;
            };
            let mut changed = false;
            if let Some(text) = text {
                if text != product.title {
                    product.title = text;
                    changed = true;
                }
            }
            changed | replace_text(&mut product.category, category)
        }
        FieldKey::ProductDescription { product_id } => {
            let Some(product) = insights.products.iter_mut().find(|p| p.id == product_id) else {
                return false;
            };
            replace_text(&mut product.description, text)
                | replace_text(&mut product.category, category)
        }
    }
}

fn replace_text(slot: &mut Option<String>, value: Option<String>) -> bool {
    match value {
        Some(value) if slot.as_deref() != Some(value.as_str()) => {
            *slot = Some(value);
            true
        }
        _ => false,
    }
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
