//! Runs every extractor against one target and folds the results into a
//! single [`BrandInsights`] record.

use std::collections::{BTreeMap, HashSet};

use futures::future::join_all;
use shopintel_core::{BrandInsights, ExtractorName, HeroProduct, Target};

use crate::error::AggregateError;
use crate::extract::{ExtractOptions, ExtractorKind, ExtractorOutcome, RawSignal, Signal};
use crate::fetch::{FetchConfig, Fetcher};

/// Probes `target`, runs `extractors` concurrently, and merges their signals.
///
/// Individual extractor failures are recorded in
/// [`BrandInsights::failures`]; only an unreachable origin is an error.
///
/// # Errors
///
/// - [`AggregateError::TargetUnreachable`] if the origin never answers.
/// - [`AggregateError::Fetch`] if the HTTP client cannot be built.
pub async fn aggregate(
    target: &Target,
    config: &FetchConfig,
    extractors: &[ExtractorKind],
    options: &ExtractOptions,
) -> Result<BrandInsights, AggregateError> {
    let fetcher = Fetcher::new(target.clone(), config)?;

    if let Err(source) = fetcher.probe().await {
        return Err(AggregateError::TargetUnreachable {
            target: target.clone(),
            source,
        });
    }

    let signals = join_all(extractors.iter().map(|kind| kind.run(&fetcher, options))).await;
    let insights = merge(target.clone(), signals);

    if insights.is_empty() {
        tracing::warn!(
            store = %target,
            unavailable = ?insights.unavailable_signals(),
            "no signals extracted"
        );
    } else {
        tracing::info!(
            store = %target,
            products = insights.products.len(),
            policies = insights.policies.len(),
            social_handles = insights.social_handles.len(),
            faqs = insights.faqs.len(),
            hero_products = insights.hero_products.len(),
            failures = insights.failures.len(),
            "aggregated brand insights"
        );
    }

    Ok(insights)
}

/// Folds `signals` into a fresh record for `target`.
#[must_use]
pub fn merge(target: Target, signals: Vec<RawSignal>) -> BrandInsights {
    merge_into(BrandInsights::new(target), signals)
}

/// Folds `signals` into `base`. Never short-circuits.
///
/// Precedence follows `signals` order: products, policies, social handles
/// and important links are keyed (by id, kind, platform, link kind) and
/// later entries replace earlier ones. FAQs and hero products keep the first
/// entry per key. Output collections are sorted, so folding the same signals
/// again is a no-op.
///
/// Every extractor ends up explained: a failure lands in `failures`, a clean
/// run that found nothing lands in `empty_signals`.
#[must_use]
pub fn merge_into(base: BrandInsights, signals: Vec<RawSignal>) -> BrandInsights {
    let mut out = base;

    let mut products: BTreeMap<_, _> = std::mem::take(&mut out.products)
        .into_iter()
        .map(|p| (p.id.clone(), p))
        .collect();
    let mut policies: BTreeMap<_, _> = std::mem::take(&mut out.policies)
        .into_iter()
        .map(|p| (p.kind, p))
        .collect();
    let mut social: BTreeMap<_, _> = std::mem::take(&mut out.social_handles)
        .into_iter()
        .map(|h| (h.platform, h))
        .collect();
    let mut seen_questions: HashSet<String> =
        out.faqs.iter().map(|f| f.question.to_lowercase()).collect();
    let mut seen_heroes: HashSet<String> =
        out.hero_products.iter().map(HeroProduct::key).collect();

    for RawSignal { extractor, outcome } in signals {
        let (signal, skipped) = match outcome {
            ExtractorOutcome::Succeeded(signal) => (signal, 0),
            ExtractorOutcome::PartiallySucceeded { signal, skipped } => (signal, skipped),
            ExtractorOutcome::Failed(reason) => {
                out.empty_signals.remove(&extractor);
                out.failures.insert(extractor, reason);
                continue;
            }
        };
        out.failures.remove(&extractor);
        if extractor == ExtractorName::ProductCatalog {
            out.skipped_products = skipped;
        }
        if signal.is_empty() {
            out.empty_signals.insert(extractor);
        } else {
            out.empty_signals.remove(&extractor);
        }

        match signal {
            Signal::Catalog {
                products: items,
                currency,
            } => {
                for product in items {
                    products.insert(product.id.clone(), product);
                }
                if currency.is_some() {
                    out.currency = currency;
                }
            }
            Signal::Policies(items) => {
                for doc in items {
                    policies.insert(doc.kind, doc);
                }
            }
            Signal::Contact(info) => out.contact.absorb(info),
            Signal::Social(items) => {
                for handle in items {
                    social.insert(handle.platform, handle);
                }
            }
            Signal::Faqs(items) => {
                for faq in items {
                    if seen_questions.insert(faq.question.to_lowercase()) {
                        out.faqs.push(faq);
                    }
                }
            }
            Signal::BrandContext(text) => {
                if text.is_some() {
                    out.brand_context = text;
                }
            }
            Signal::HeroProducts(items) => {
                for hero in items {
                    if seen_heroes.insert(hero.key()) {
                        out.hero_products.push(hero);
                    }
                }
            }
            Signal::ImportantLinks(links) => out.important_links.extend(links),
        }
    }

    out.products = products.into_values().collect();
    out.policies = policies.into_values().collect();
    out.social_handles = social.into_values().collect();
    out
}

#[cfg(test)]
#[path = "aggregate_test.rs"]
mod tests;
