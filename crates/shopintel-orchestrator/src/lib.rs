//! Sequences storefront extraction across single, competitive, and bulk
//! runs.

pub mod bulk;
pub mod competitive;
pub mod discovery;
pub mod error;
pub mod options;
pub mod orchestrator;
pub mod registry;

pub use bulk::{BulkJobHandle, BulkSummary};
pub use competitive::{CompetitiveReport, CompetitiveSummary, TargetReport, TargetSummary};
pub use discovery::{CatalogDiscovery, Competitor, CompetitorDiscovery, CompetitorEntry};
pub use error::{DiscoveryError, OrchestratorError};
pub use options::{ExtractOptions, ExtractOutput, Mode, OrchestratorConfig};
pub use orchestrator::Orchestrator;
pub use registry::JobRegistry;
