//! The aggregated brand-insights record and the entities it owns.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Target;

/// A product from the storefront catalog, normalized for comparison across
/// stores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Shopify product ID as a trimmed string. Numeric and string IDs from
    /// different store configurations normalize to the same key.
    pub id: String,
    pub title: String,
    /// URL slug, e.g. `"classic-tee"`.
    pub handle: Option<String>,
    pub vendor: Option<String>,
    pub product_type: Option<String>,
    /// Plain-text description derived from `body_html`.
    pub description: Option<String>,
    /// Trimmed, lower-cased tags.
    pub tags: BTreeSet<String>,
    pub variants: Vec<Variant>,
    pub images: Vec<String>,
    /// Category assigned by the normalization pass, if any.
    pub category: Option<String>,
}

/// A purchasable variant of a [`Product`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: Option<String>,
    pub title: String,
    /// Decimal string exactly as the storefront returns it, e.g. `"30.00"`.
    pub price: Option<String>,
    pub compare_at_price: Option<String>,
    pub sku: Option<String>,
    pub available: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub emails: BTreeSet<String>,
    pub phones: BTreeSet<String>,
    pub addresses: Vec<String>,
}

impl ContactInfo {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty() && self.phones.is_empty() && self.addresses.is_empty()
    }

    /// Folds `other` into `self`, deduplicating by normalized string equality.
    pub fn absorb(&mut self, other: ContactInfo) {
        self.emails.extend(other.emails);
        self.phones.extend(other.phones);
        for address in other.addresses {
            if !self.addresses.contains(&address) {
                self.addresses.push(address);
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Instagram,
    Facebook,
    Twitter,
    #[serde(rename = "tiktok")]
    TikTok,
    #[serde(rename = "youtube")]
    YouTube,
    #[serde(rename = "linkedin")]
    LinkedIn,
    Pinterest,
}

impl Platform {
    pub const ALL: [Platform; 7] = [
        Platform::Instagram,
        Platform::Facebook,
        Platform::Twitter,
        Platform::TikTok,
        Platform::YouTube,
        Platform::LinkedIn,
        Platform::Pinterest,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Instagram => "instagram",
            Platform::Facebook => "facebook",
            Platform::Twitter => "twitter",
            Platform::TikTok => "tiktok",
            Platform::YouTube => "youtube",
            Platform::LinkedIn => "linkedin",
            Platform::Pinterest => "pinterest",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialHandle {
    pub platform: Platform,
    /// Handle without a leading `@`, e.g. `"allbirds"`.
    pub handle: String,
    /// Canonical profile URL built from the platform and handle.
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    Privacy,
    Refund,
    Return,
    Shipping,
    Terms,
}

impl PolicyKind {
    pub const ALL: [PolicyKind; 5] = [
        PolicyKind::Privacy,
        PolicyKind::Refund,
        PolicyKind::Return,
        PolicyKind::Shipping,
        PolicyKind::Terms,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PolicyKind::Privacy => "privacy",
            PolicyKind::Refund => "refund",
            PolicyKind::Return => "return",
            PolicyKind::Shipping => "shipping",
            PolicyKind::Terms => "terms",
        }
    }
}

impl std::fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    pub kind: PolicyKind,
    /// Page the body was extracted from.
    pub url: String,
    pub body: String,
}

/// A product featured on the homepage (hero banner, featured grid, carousel).
///
/// Fields are whatever the theme exposes; at least one of `title` or `url` is
/// always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeroProduct {
    pub title: Option<String>,
    pub url: Option<String>,
    pub image: Option<String>,
    /// Price text as displayed, e.g. `"$98.00"`.
    pub price: Option<String>,
}

impl HeroProduct {
    /// Dedup key: the link when present, otherwise the lower-cased title.
    #[must_use]
    pub fn key(&self) -> String {
        match (&self.url, &self.title) {
            (Some(url), _) => url.clone(),
            (None, Some(title)) => title.to_lowercase(),
            (None, None) => String::new(),
        }
    }
}

/// Navigation destinations worth surfacing for a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    OrderTracking,
    ContactUs,
    Blog,
    Support,
    StoreLocator,
    SizeGuide,
}

impl LinkKind {
    pub const ALL: [LinkKind; 6] = [
        LinkKind::OrderTracking,
        LinkKind::ContactUs,
        LinkKind::Blog,
        LinkKind::Support,
        LinkKind::StoreLocator,
        LinkKind::SizeGuide,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LinkKind::OrderTracking => "order_tracking",
            LinkKind::ContactUs => "contact_us",
            LinkKind::Blog => "blog",
            LinkKind::Support => "support",
            LinkKind::StoreLocator => "store_locator",
            LinkKind::SizeGuide => "size_guide",
        }
    }
}

impl std::fmt::Display for LinkKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// Identifies one signal source. Serialized names are the keys of
/// [`BrandInsights::failures`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExtractorName {
    #[serde(rename = "ProductCatalogExtractor")]
    ProductCatalog,
    #[serde(rename = "PolicyExtractor")]
    Policy,
    #[serde(rename = "ContactExtractor")]
    Contact,
    #[serde(rename = "SocialHandleExtractor")]
    SocialHandle,
    #[serde(rename = "FAQExtractor")]
    Faq,
    #[serde(rename = "BrandContextExtractor")]
    BrandContext,
    #[serde(rename = "HeroProductExtractor")]
    HeroProducts,
    #[serde(rename = "ImportantLinksExtractor")]
    ImportantLinks,
}

impl ExtractorName {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractorName::ProductCatalog => "ProductCatalogExtractor",
            ExtractorName::Policy => "PolicyExtractor",
            ExtractorName::Contact => "ContactExtractor",
            ExtractorName::SocialHandle => "SocialHandleExtractor",
            ExtractorName::Faq => "FAQExtractor",
            ExtractorName::BrandContext => "BrandContextExtractor",
            ExtractorName::HeroProducts => "HeroProductExtractor",
            ExtractorName::ImportantLinks => "ImportantLinksExtractor",
        }
    }
}

impl std::fmt::Display for ExtractorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a signal source produced nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason")]
pub enum FailureReason {
    Timeout,
    HttpError { status: u16 },
    ConnectionError,
    CatalogUnavailable { detail: String },
    MalformedData { detail: String },
}

impl std::fmt::Display for FailureReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureReason::Timeout => write!(f, "timeout"),
            FailureReason::HttpError { status } => write!(f, "HTTP {status}"),
            FailureReason::ConnectionError => write!(f, "connection error"),
            FailureReason::CatalogUnavailable { detail } => {
                write!(f, "catalog unavailable: {detail}")
            }
            FailureReason::MalformedData { detail } => write!(f, "malformed data: {detail}"),
        }
    }
}

/// Everything extracted for one [`Target`].
///
/// Built fresh per extraction request. Collections are kept in canonical
/// order (products by id, policies by kind, handles by platform) so the same
/// inputs always serialize identically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrandInsights {
    pub target: Target,
    pub extracted_at: DateTime<Utc>,
    pub products: Vec<Product>,
    /// ISO 4217 code the storefront prices in, when it could be detected.
    pub currency: Option<String>,
    /// Catalog entries dropped because they could not be decoded.
    pub skipped_products: usize,
    pub policies: Vec<PolicyDocument>,
    pub contact: ContactInfo,
    pub social_handles: Vec<SocialHandle>,
    pub faqs: Vec<FaqEntry>,
    /// About-page text, if the store has one.
    pub brand_context: Option<String>,
    pub hero_products: Vec<HeroProduct>,
    pub important_links: BTreeMap<LinkKind, String>,
    pub failures: BTreeMap<ExtractorName, FailureReason>,
    /// Extractors that ran cleanly but found nothing on the storefront.
    pub empty_signals: BTreeSet<ExtractorName>,
    /// Set when the normalization collaborator could not be reached.
    pub normalization_skipped: bool,
}

impl BrandInsights {
    #[must_use]
    pub fn new(target: Target) -> Self {
        Self {
            target,
            extracted_at: Utc::now(),
            products: Vec::new(),
            currency: None,
            skipped_products: 0,
            policies: Vec::new(),
            contact: ContactInfo::default(),
            social_handles: Vec::new(),
            faqs: Vec::new(),
            brand_context: None,
            hero_products: Vec::new(),
            important_links: BTreeMap::new(),
            failures: BTreeMap::new(),
            empty_signals: BTreeSet::new(),
            normalization_skipped: false,
        }
    }

    /// `true` when no extractor contributed any data.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
            && self.policies.is_empty()
            && self.contact.is_empty()
            && self.social_handles.is_empty()
            && self.faqs.is_empty()
            && self.brand_context.is_none()
            && self.currency.is_none()
            && self.hero_products.is_empty()
            && self.important_links.is_empty()
    }

    /// Human-readable list of unavailable signals and why: failed extractors
    /// first, then those that found nothing.
    #[must_use]
    pub fn unavailable_signals(&self) -> Vec<String> {
        self.failures
            .iter()
            .map(|(name, reason)| format!("{name}: {reason}"))
            .chain(
                self.empty_signals
                    .iter()
                    .map(|name| format!("{name}: nothing found")),
            )
            .collect()
    }

    #[must_use]
    pub fn policy(&self, kind: PolicyKind) -> Option<&PolicyDocument> {
        self.policies.iter().find(|p| p.kind == kind)
    }

    #[must_use]
    pub fn social_handle(&self, platform: Platform) -> Option<&SocialHandle> {
        self.social_handles.iter().find(|h| h.platform == platform)
    }
}
