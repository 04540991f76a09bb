use shopintel_core::CoreError;
use shopintel_scraper::AggregateError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error(transparent)]
    Aggregate(#[from] AggregateError),

    #[error("competitor discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error("bulk job {0} not found")]
    JobNotFound(Uuid),

    #[error("bulk job update rejected: {0}")]
    Job(#[from] CoreError),

    #[error("failed to set up text structurer: {0}")]
    Normalizer(#[from] shopintel_normalizer::NormalizerError),
}

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("failed to read competitor catalog {path}: {source}")]
    CatalogIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse competitor catalog: {0}")]
    CatalogParse(#[from] serde_yaml::Error),

    #[error("invalid competitor catalog: {0}")]
    Validation(String),
}
