use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use shopintel_core::{AppConfig, BrandInsights, BulkJob, Target};
use shopintel_normalizer::{normalize, structurer_from_config, TextStructurer};
use shopintel_scraper::{aggregate, ExtractOptions as ScrapeOptions, ExtractorKind};
use uuid::Uuid;

use crate::bulk::{run_job, BulkJobHandle};
use crate::competitive::{CompetitiveReport, TargetReport};
use crate::discovery::{CatalogDiscovery, CompetitorDiscovery};
use crate::error::OrchestratorError;
use crate::options::{ExtractOptions, ExtractOutput, Mode, OrchestratorConfig};
use crate::registry::JobRegistry;

struct Inner {
    config: OrchestratorConfig,
    structurer: Arc<dyn TextStructurer>,
    discovery: Arc<dyn CompetitorDiscovery>,
    jobs: JobRegistry,
}

/// Entry point for every extraction request. Clones share one job registry.
#[derive(Clone)]
pub struct Orchestrator {
    inner: Arc<Inner>,
}

impl Orchestrator {
    #[must_use]
    pub fn new(
        config: OrchestratorConfig,
        structurer: Arc<dyn TextStructurer>,
        discovery: Arc<dyn CompetitorDiscovery>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                structurer,
                discovery,
                jobs: JobRegistry::new(),
            }),
        }
    }

    /// Wires the orchestrator from application config.
    ///
    /// A missing competitor catalog file disables discovery rather than
    /// failing; competitive runs then need explicit competitor URLs.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Discovery`] if the catalog exists but is
    /// invalid, or [`OrchestratorError::Normalizer`] if the structurer client
    /// cannot be built.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, OrchestratorError> {
        let discovery = if config.competitors_path.exists() {
            CatalogDiscovery::load(&config.competitors_path)?
        } else {
            tracing::warn!(
                path = %config.competitors_path.display(),
                "competitor catalog not found; discovery disabled"
            );
            CatalogDiscovery::default()
        };
        let structurer = structurer_from_config(config)?;
        Ok(Self::new(
            OrchestratorConfig::from_app_config(config),
            structurer,
            Arc::new(discovery),
        ))
    }

    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    pub(crate) fn registry(&self) -> &JobRegistry {
        &self.inner.jobs
    }

    /// Runs one request in the given mode.
    ///
    /// # Errors
    ///
    /// Single and competitive runs fail when the primary target is
    /// unreachable or competitor discovery fails. Bulk runs never fail here;
    /// per-target failures are recorded in the job.
    pub async fn extract(
        &self,
        target: Target,
        mode: Mode,
        options: ExtractOptions,
    ) -> Result<ExtractOutput, OrchestratorError> {
        match mode {
            Mode::Single => Ok(ExtractOutput::Single(Box::new(
                self.single(&target, &options).await?,
            ))),
            Mode::Competitive => Ok(ExtractOutput::Competitive(
                self.competitive(&target, &options).await?,
            )),
            Mode::Bulk(rest) => {
                let targets = std::iter::once(target).chain(rest).collect();
                Ok(ExtractOutput::Bulk(self.start_bulk(targets, options)))
            }
        }
    }

    /// Aggregates one target, then normalizes it if requested.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::Aggregate`] if the target is unreachable.
    pub async fn single(
        &self,
        target: &Target,
        options: &ExtractOptions,
    ) -> Result<BrandInsights, OrchestratorError> {
        let scrape = ScrapeOptions {
            max_products: options
                .max_products
                .unwrap_or(self.inner.config.max_products),
        };
        let insights = aggregate(
            target,
            &self.inner.config.fetch,
            &ExtractorKind::ALL,
            &scrape,
        )
        .await?;

        if options.enable_normalization {
            Ok(normalize(insights, self.inner.structurer.as_ref()).await)
        } else {
            Ok(insights)
        }
    }

    /// Aggregates `primary`, then each competitor independently.
    ///
    /// Competitors come from `options.competitor_urls` when set, otherwise
    /// from discovery. A competitor that fails is reported as failed without
    /// affecting the others.
    ///
    /// # Errors
    ///
    /// Returns an error if the primary cannot be aggregated or discovery fails.
    pub async fn competitive(
        &self,
        primary: &Target,
        options: &ExtractOptions,
    ) -> Result<CompetitiveReport, OrchestratorError> {
        let primary_insights = self.single(primary, options).await?;

        let candidates: Vec<Target> = match &options.competitor_urls {
            Some(urls) => urls.clone(),
            None => self
                .inner
                .discovery
                .discover(&primary_insights, self.inner.config.discovery_limit)
                .await?
                .into_iter()
                .map(|c| c.target)
                .collect(),
        };

        let mut seen = std::collections::HashSet::from([primary.clone()]);
        let competitors: Vec<Target> = candidates
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();

        tracing::info!(
            store = %primary,
            competitors = competitors.len(),
            "starting competitive run"
        );

        let max_concurrent = self.inner.config.max_concurrent_targets.max(1);
        let reports: Vec<TargetReport> = stream::iter(competitors)
            .map(|target| async move {
                match self.single(&target, options).await {
                    Ok(insights) => TargetReport::succeeded(insights),
                    Err(e) => {
                        tracing::warn!(store = %target, error = %e, "competitor failed");
                        TargetReport::failed(target, e.to_string())
                    }
                }
            })
            .buffered(max_concurrent)
            .collect()
            .await;

        Ok(CompetitiveReport::new(primary_insights, reports))
    }

    /// Registers a bulk job and processes it on a background task.
    ///
    /// Duplicate targets are dropped, keeping the first occurrence.
    #[must_use]
    pub fn start_bulk(&self, targets: Vec<Target>, options: ExtractOptions) -> BulkJobHandle {
        let mut seen = std::collections::HashSet::new();
        let targets: Vec<Target> = targets
            .into_iter()
            .filter(|t| seen.insert(t.clone()))
            .collect();

        let job = BulkJob::new(targets.clone());
        let handle = BulkJobHandle {
            id: job.id,
            total: job.entries.len(),
            created_at: job.created_at,
        };
        let cancel = self.inner.jobs.register(job);

        tracing::info!(job_id = %handle.id, total = handle.total, "bulk job started");
        tokio::spawn(run_job(self.clone(), handle.id, targets, cancel, options));
        handle
    }

    /// Requests cooperative cancellation of a bulk job.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::JobNotFound`] for an unknown id.
    pub fn cancel(&self, job_id: Uuid) -> Result<(), OrchestratorError> {
        self.inner.jobs.request_cancel(job_id)?;
        tracing::info!(job_id = %job_id, "bulk job cancellation requested");
        Ok(())
    }

    #[must_use]
    pub fn job_snapshot(&self, job_id: Uuid) -> Option<BulkJob> {
        self.inner.jobs.snapshot(job_id)
    }

    /// Polls a job until every entry is terminal, calling `on_progress` with
    /// each snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::JobNotFound`] for an unknown id.
    pub async fn wait_for_job<F>(
        &self,
        job_id: Uuid,
        poll_interval: Duration,
        mut on_progress: F,
    ) -> Result<BulkJob, OrchestratorError>
    where
        F: FnMut(&BulkJob),
    {
        loop {
            let job = self
                .job_snapshot(job_id)
                .ok_or(OrchestratorError::JobNotFound(job_id))?;
            on_progress(&job);
            if job.is_finished() {
                return Ok(job);
            }
            tokio::time::sleep(poll_interval).await;
        }
    }
}
