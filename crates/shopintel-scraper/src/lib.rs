//! Storefront fetching, signal extraction, and aggregation into
//! [`shopintel_core::BrandInsights`].

pub mod aggregate;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod html;
pub mod normalize;
mod retry;
pub mod types;

pub use aggregate::{aggregate, merge, merge_into};
pub use error::{AggregateError, FetchError, StateError};
pub use extract::{ExtractOptions, ExtractorKind, ExtractorOutcome, RawSignal, Signal};
pub use fetch::{Expect, FetchConfig, Fetcher, Payload};
pub use normalize::{normalize_product, normalize_tags};
pub use types::{RawProduct, RawScalar, RawVariant, TagField};
