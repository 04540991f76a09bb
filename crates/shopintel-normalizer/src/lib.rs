//! Optional post-processing of [`shopintel_core::BrandInsights`] through a
//! text-structuring collaborator.

pub mod category;
pub mod error;
pub mod normalize;
pub mod structurer;
pub mod types;

pub use category::categorize;
pub use error::NormalizerError;
pub use normalize::{build_request, normalize};
pub use structurer::{
    structurer_from_config, HttpStructurer, KeywordStructurer, TextStructurer,
    UnavailableStructurer,
};
pub use types::{FieldKey, StructureRequest, StructureResponse, StructuredItem, TextItem};
