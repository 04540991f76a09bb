use serde::Serialize;
use shopintel_core::{AppConfig, BrandInsights, Target};
use shopintel_scraper::FetchConfig;

use crate::bulk::BulkJobHandle;
use crate::competitive::CompetitiveReport;

/// Number of competitors discovered when none are given.
pub const DEFAULT_DISCOVERY_LIMIT: usize = 3;

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub fetch: FetchConfig,
    /// Upper bound on targets aggregated at once in competitive and bulk runs.
    pub max_concurrent_targets: usize,
    /// Catalog cap used when a request leaves `max_products` unset.
    pub max_products: usize,
    pub discovery_limit: usize,
}

impl OrchestratorConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            fetch: FetchConfig::from_app_config(config),
            max_concurrent_targets: config.max_concurrent_targets.max(1),
            max_products: config.max_products,
            discovery_limit: DEFAULT_DISCOVERY_LIMIT,
        }
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            max_concurrent_targets: 3,
            max_products: 1000,
            discovery_limit: DEFAULT_DISCOVERY_LIMIT,
        }
    }
}

/// How a request fans out over targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Single,
    /// The target plus its competitors, either given in
    /// [`ExtractOptions::competitor_urls`] or discovered.
    Competitive,
    /// A background job over the target followed by these additional targets.
    Bulk(Vec<Target>),
}

/// Per-request options.
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    pub competitor_urls: Option<Vec<Target>>,
    pub max_products: Option<usize>,
    pub enable_normalization: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "mode", content = "result", rename_all = "snake_case")]
pub enum ExtractOutput {
    Single(Box<BrandInsights>),
    Competitive(CompetitiveReport),
    Bulk(BulkJobHandle),
}
