//! Shared domain types and configuration for the shopintel workspace.

pub mod app_config;
pub mod config;
pub mod error;
pub mod insights;
pub mod job;
pub mod target;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::{ConfigError, CoreError};
pub use insights::{
    BrandInsights, ContactInfo, ExtractorName, FailureReason, FaqEntry, HeroProduct, LinkKind,
    Platform, PolicyDocument, PolicyKind, Product, SocialHandle, Variant,
};
pub use job::{BulkEntry, BulkJob, StatusCounts, TargetStatus};
pub use target::Target;
