//! Independent signal extractors.
//!
//! Each extractor turns one slice of a storefront into a [`RawSignal`].
//! Extractors never return `Err`: every failure is folded into
//! [`ExtractorOutcome::Failed`] so a single bad source cannot sink the rest.

mod brand_context;
mod catalog;
mod contact;
mod faq;
mod hero;
mod links;
mod policy;
mod social;
pub mod state;

use std::collections::BTreeMap;

use shopintel_core::{
    ContactInfo, ExtractorName, FailureReason, FaqEntry, HeroProduct, LinkKind, PolicyDocument,
    Product, SocialHandle,
};

use crate::error::FetchError;
use crate::fetch::Fetcher;
use state::ExtractorRun;

/// Per-request extraction limits.
#[derive(Debug, Clone, Copy)]
pub struct ExtractOptions {
    pub max_products: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self { max_products: 1000 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Signal {
    Catalog {
        products: Vec<Product>,
        currency: Option<String>,
    },
    Policies(Vec<PolicyDocument>),
    Contact(ContactInfo),
    Social(Vec<SocialHandle>),
    Faqs(Vec<FaqEntry>),
    BrandContext(Option<String>),
    HeroProducts(Vec<HeroProduct>),
    ImportantLinks(BTreeMap<LinkKind, String>),
}

impl Signal {
    /// `true` when the extractor ran but found nothing to report.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Signal::Catalog { products, currency } => products.is_empty() && currency.is_none(),
            Signal::Policies(items) => items.is_empty(),
            Signal::Contact(info) => info.is_empty(),
            Signal::Social(items) => items.is_empty(),
            Signal::Faqs(items) => items.is_empty(),
            Signal::BrandContext(text) => text.is_none(),
            Signal::HeroProducts(items) => items.is_empty(),
            Signal::ImportantLinks(links) => links.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtractorOutcome {
    Succeeded(Signal),
    /// Usable data, but `skipped` entries were dropped or a later page failed.
    PartiallySucceeded {
        signal: Signal,
        skipped: usize,
    },
    Failed(FailureReason),
}

/// The immutable result of one extractor run.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSignal {
    pub extractor: ExtractorName,
    pub outcome: ExtractorOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtractorKind {
    ProductCatalog,
    Policy,
    Contact,
    SocialHandle,
    Faq,
    BrandContext,
    HeroProducts,
    ImportantLinks,
}

impl ExtractorKind {
    /// Declaration order. Later extractors win merge ties.
    pub const ALL: [ExtractorKind; 8] = [
        ExtractorKind::ProductCatalog,
        ExtractorKind::Policy,
        ExtractorKind::Contact,
        ExtractorKind::SocialHandle,
        ExtractorKind::Faq,
        ExtractorKind::BrandContext,
        ExtractorKind::HeroProducts,
        ExtractorKind::ImportantLinks,
    ];

    #[must_use]
    pub fn name(self) -> ExtractorName {
        match self {
            ExtractorKind::ProductCatalog => ExtractorName::ProductCatalog,
            ExtractorKind::Policy => ExtractorName::Policy,
            ExtractorKind::Contact => ExtractorName::Contact,
            ExtractorKind::SocialHandle => ExtractorName::SocialHandle,
            ExtractorKind::Faq => ExtractorName::Faq,
            ExtractorKind::BrandContext => ExtractorName::BrandContext,
            ExtractorKind::HeroProducts => ExtractorName::HeroProducts,
            ExtractorKind::ImportantLinks => ExtractorName::ImportantLinks,
        }
    }

    pub async fn run(self, fetcher: &Fetcher, options: &ExtractOptions) -> RawSignal {
        let name = self.name();
        let target = fetcher.target();
        let mut run = ExtractorRun::new(name);
        if let Err(e) = run.start() {
            tracing::error!(extractor = %name, error = %e, "extractor lifecycle violation");
        }

        let outcome = match self {
            ExtractorKind::ProductCatalog => catalog::extract(fetcher, options).await,
            ExtractorKind::Policy => policy::extract(fetcher).await,
            ExtractorKind::Contact => contact::extract(fetcher).await,
            ExtractorKind::SocialHandle => social::extract(fetcher).await,
            ExtractorKind::Faq => faq::extract(fetcher).await,
            ExtractorKind::BrandContext => brand_context::extract(fetcher).await,
            ExtractorKind::HeroProducts => hero::extract(fetcher).await,
            ExtractorKind::ImportantLinks => links::extract(fetcher).await,
        };

        if let Err(e) = run.finish(&outcome) {
            tracing::error!(extractor = %name, error = %e, "extractor lifecycle violation");
        }

        match &outcome {
            ExtractorOutcome::Succeeded(_) => {
                tracing::debug!(store = %target, extractor = %name, "extractor succeeded");
            }
            ExtractorOutcome::PartiallySucceeded { skipped, .. } => {
                tracing::info!(
                    store = %target,
                    extractor = %name,
                    skipped,
                    "extractor partially succeeded"
                );
            }
            ExtractorOutcome::Failed(reason) => {
                tracing::warn!(
                    store = %target,
                    extractor = %name,
                    reason = %reason,
                    "extractor failed"
                );
            }
        }

        RawSignal {
            extractor: name,
            outcome,
        }
    }
}

/// Fetches the homepage for extractors that only look there.
async fn homepage(fetcher: &Fetcher) -> Result<String, FailureReason> {
    fetcher
        .fetch_html("/")
        .await
        .map_err(|e| e.failure_reason())
}

/// Result of walking a list of candidate pages.
enum Scan<T> {
    /// A page yielded a value.
    Found(T),
    /// At least one page loaded, none yielded anything.
    Nothing,
    /// Every candidate fetch failed; holds the last error.
    AllFailed(FetchError),
}

/// Fetches `paths` in order until `visit` yields a value.
///
/// A failed candidate never aborts the walk.
async fn scan_candidates<T, F>(fetcher: &Fetcher, paths: &[&str], mut visit: F) -> Scan<T>
where
    F: FnMut(&str, &str) -> Option<T>,
{
    let mut last_err = None;
    let mut loaded_any = false;

    for path in paths {
        match fetcher.fetch_html(path).await {
            Ok(html) => {
                loaded_any = true;
                let url = fetcher.target().url_for(path);
                if let Some(found) = visit(&url, &html) {
                    return Scan::Found(found);
                }
            }
            Err(e) => {
                tracing::debug!(path, error = %e, "candidate page unavailable");
                last_err = Some(e);
            }
        }
    }

    match (loaded_any, last_err) {
        (false, Some(e)) => Scan::AllFailed(e),
        _ => Scan::Nothing,
    }
}

const ABOUT_PATHS: &[&str] = &[
    "/pages/about",
    "/pages/about-us",
    "/about",
    "/about-us",
    "/pages/our-story",
    "/our-story",
];
