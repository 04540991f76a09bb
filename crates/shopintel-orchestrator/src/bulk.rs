//! Background bulk extraction.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use shopintel_core::{BulkJob, StatusCounts, Target, TargetStatus};
use uuid::Uuid;

use crate::options::ExtractOptions;
use crate::orchestrator::Orchestrator;

/// Returned when a bulk job starts; pass `id` to
/// [`Orchestrator::job_snapshot`] to follow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkJobHandle {
    pub id: Uuid,
    pub total: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkSummary {
    pub job_id: Uuid,
    pub total: usize,
    pub counts: StatusCounts,
    /// Succeeded over processed (succeeded + failed). `None` before any
    /// target has been processed.
    pub success_rate: Option<f64>,
    /// Wall time from job creation to the last terminal transition.
    pub processing_ms: Option<i64>,
}

impl BulkSummary {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_job(job: &BulkJob) -> Self {
        let counts = job.counts();
        let processed = counts.succeeded + counts.failed;
        let success_rate = (processed > 0).then(|| counts.succeeded as f64 / processed as f64);
        Self {
            job_id: job.id,
            total: job.entries.len(),
            counts,
            success_rate,
            processing_ms: job
                .finished_at
                .map(|done| (done - job.created_at).num_milliseconds()),
        }
    }
}

/// Drives every entry of job `job_id` to a terminal state.
///
/// At most `max_concurrent_targets` targets run at once. The cancel flag is
/// checked right before each target starts, so cancelling never interrupts
/// a target that is already running.
pub(crate) async fn run_job(
    orchestrator: Orchestrator,
    job_id: Uuid,
    targets: Vec<Target>,
    cancel: Arc<AtomicBool>,
    options: ExtractOptions,
) {
    let max_concurrent = orchestrator.config().max_concurrent_targets.max(1);
    let total = targets.len();

    stream::iter(targets.into_iter().enumerate())
        .map(|(index, target)| {
            let orchestrator = orchestrator.clone();
            let cancel = Arc::clone(&cancel);
            let options = options.clone();
            async move {
                process_entry(&orchestrator, job_id, index, &target, &cancel, &options).await;
            }
        })
        .buffer_unordered(max_concurrent)
        .collect::<Vec<()>>()
        .await;

    if let Some(job) = orchestrator.job_snapshot(job_id) {
        let summary = BulkSummary::from_job(&job);
        tracing::info!(
            job_id = %job_id,
            total,
            succeeded = summary.counts.succeeded,
            failed = summary.counts.failed,
            cancelled = summary.counts.cancelled,
            processing_ms = summary.processing_ms.unwrap_or_default(),
            "bulk job finished"
        );
    }
}

async fn process_entry(
    orchestrator: &Orchestrator,
    job_id: Uuid,
    index: usize,
    target: &Target,
    cancel: &AtomicBool,
    options: &ExtractOptions,
) {
    let registry = orchestrator.registry();

    if cancel.load(Ordering::SeqCst) {
        if let Err(e) = registry.update(job_id, |job| job.transition(index, TargetStatus::Cancelled))
        {
            tracing::error!(job_id = %job_id, store = %target, error = %e, "failed to cancel entry");
        }
        return;
    }

    if let Err(e) = registry.update(job_id, |job| job.transition(index, TargetStatus::Running)) {
        tracing::error!(job_id = %job_id, store = %target, error = %e, "failed to start entry");
        return;
    }

    let result = orchestrator.single(target, options).await;
    let recorded = match result {
        Ok(insights) => registry.update(job_id, |job| job.complete(index, insights)),
        Err(e) => {
            tracing::warn!(job_id = %job_id, store = %target, error = %e, "bulk target failed");
            let message = e.to_string();
            registry.update(job_id, |job| job.fail(index, message))
        }
    };
    if let Err(e) = recorded {
        tracing::error!(job_id = %job_id, store = %target, error = %e, "failed to record entry");
    }
}
