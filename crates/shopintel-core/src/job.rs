//! Bulk job state: per-target status table and progress.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{BrandInsights, CoreError, Target};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl TargetStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            TargetStatus::Succeeded | TargetStatus::Failed | TargetStatus::Cancelled
        )
    }

    /// Allowed edges: `Pending -> Running | Cancelled`,
    /// `Running -> Succeeded | Failed`.
    #[must_use]
    pub fn can_transition_to(self, next: TargetStatus) -> bool {
        matches!(
            (self, next),
            (TargetStatus::Pending, TargetStatus::Running | TargetStatus::Cancelled)
                | (TargetStatus::Running, TargetStatus::Succeeded | TargetStatus::Failed)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkEntry {
    pub target: Target,
    pub status: TargetStatus,
    pub error: Option<String>,
    pub insights: Option<Box<BrandInsights>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub pending: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl StatusCounts {
    #[must_use]
    pub fn terminal(&self) -> usize {
        self.succeeded + self.failed + self.cancelled
    }
}

/// A batch of targets processed in the background.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkJob {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    /// Set once every entry is terminal.
    pub finished_at: Option<DateTime<Utc>>,
    pub entries: Vec<BulkEntry>,
    pub cancel_requested: bool,
    /// Fraction of entries in a terminal state, in `[0.0, 1.0]`.
    pub progress: f64,
}

impl BulkJob {
    #[must_use]
    pub fn new(targets: Vec<Target>) -> Self {
        let entries = targets
            .into_iter()
            .map(|target| BulkEntry {
                target,
                status: TargetStatus::Pending,
                error: None,
                insights: None,
            })
            .collect::<Vec<_>>();
        let mut job = Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            finished_at: None,
            entries,
            cancel_requested: false,
            progress: 0.0,
        };
        job.refresh_progress();
        job
    }

    /// Moves entry `index` to `next`, then recomputes progress.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EntryOutOfRange`] for a bad index and
    /// [`CoreError::InvalidTransition`] for an edge the status machine does
    /// not allow (including any move out of a terminal state).
    pub fn transition(&mut self, index: usize, next: TargetStatus) -> Result<(), CoreError> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(CoreError::EntryOutOfRange { index, len })?;

        if !entry.status.can_transition_to(next) {
            return Err(CoreError::InvalidTransition {
                target: entry.target.to_string(),
                from: entry.status,
                to: next,
            });
        }
        entry.status = next;
        self.refresh_progress();
        Ok(())
    }

    /// Marks entry `index` succeeded and attaches its insights.
    ///
    /// # Errors
    ///
    /// Same as [`BulkJob::transition`].
    pub fn complete(&mut self, index: usize, insights: BrandInsights) -> Result<(), CoreError> {
        self.transition(index, TargetStatus::Succeeded)?;
        self.entries[index].insights = Some(Box::new(insights));
        Ok(())
    }

    /// Marks entry `index` failed with a message.
    ///
    /// # Errors
    ///
    /// Same as [`BulkJob::transition`].
    pub fn fail(&mut self, index: usize, error: String) -> Result<(), CoreError> {
        self.transition(index, TargetStatus::Failed)?;
        self.entries[index].error = Some(error);
        Ok(())
    }

    #[must_use]
    pub fn counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for entry in &self.entries {
            match entry.status {
                TargetStatus::Pending => counts.pending += 1,
                TargetStatus::Running => counts.running += 1,
                TargetStatus::Succeeded => counts.succeeded += 1,
                TargetStatus::Failed => counts.failed += 1,
                TargetStatus::Cancelled => counts.cancelled += 1,
            }
        }
        counts
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.entries.iter().all(|e| e.status.is_terminal())
    }

    #[allow(clippy::cast_precision_loss)]
    fn refresh_progress(&mut self) {
        let total = self.entries.len();
        self.progress = if total == 0 {
            1.0
        } else {
            self.counts().terminal() as f64 / total as f64
        };
        if self.finished_at.is_none() && self.is_finished() {
            self.finished_at = Some(Utc::now());
        }
    }
}
