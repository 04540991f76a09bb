//! In-memory store of bulk jobs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use shopintel_core::{BulkJob, CoreError};
use uuid::Uuid;

use crate::error::OrchestratorError;

struct Slot {
    job: BulkJob,
    cancel: Arc<AtomicBool>,
}

#[derive(Default)]
struct Arena {
    slots: Vec<Slot>,
    index: HashMap<Uuid, usize>,
}

/// Jobs live in an append-only arena indexed by id.
///
/// Readers only ever receive clones. Status changes go through
/// [`JobRegistry::update`], which is called solely by the task driving the
/// job, so each job's status table has a single writer.
#[derive(Default)]
pub struct JobRegistry {
    arena: RwLock<Arena>,
}

impl JobRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `job` and returns the cancellation flag its runner must check.
    pub fn register(&self, job: BulkJob) -> Arc<AtomicBool> {
        let cancel = Arc::new(AtomicBool::new(job.cancel_requested));
        let mut arena = self.arena.write().unwrap_or_else(PoisonError::into_inner);
        let position = arena.slots.len();
        arena.index.insert(job.id, position);
        arena.slots.push(Slot {
            job,
            cancel: Arc::clone(&cancel),
        });
        cancel
    }

    #[must_use]
    pub fn snapshot(&self, id: Uuid) -> Option<BulkJob> {
        let arena = self.arena.read().unwrap_or_else(PoisonError::into_inner);
        arena
            .index
            .get(&id)
            .map(|&position| arena.slots[position].job.clone())
    }

    /// Applies `change` to job `id` under the write lock.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::JobNotFound`] for an unknown id and
    /// [`OrchestratorError::Job`] when `change` rejects the update.
    pub fn update<F, R>(&self, id: Uuid, change: F) -> Result<R, OrchestratorError>
    where
        F: FnOnce(&mut BulkJob) -> Result<R, CoreError>,
    {
        let mut arena = self.arena.write().unwrap_or_else(PoisonError::into_inner);
        let position = *arena
            .index
            .get(&id)
            .ok_or(OrchestratorError::JobNotFound(id))?;
        Ok(change(&mut arena.slots[position].job)?)
    }

    /// Flags job `id` for cancellation. Targets not yet started will be
    /// skipped; targets already running finish normally.
    ///
    /// # Errors
    ///
    /// Returns [`OrchestratorError::JobNotFound`] for an unknown id.
    pub fn request_cancel(&self, id: Uuid) -> Result<(), OrchestratorError> {
        let mut arena = self.arena.write().unwrap_or_else(PoisonError::into_inner);
        let position = *arena
            .index
            .get(&id)
            .ok_or(OrchestratorError::JobNotFound(id))?;
        let slot = &mut arena.slots[position];
        slot.job.cancel_requested = true;
        slot.cancel.store(true, Ordering::SeqCst);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.arena
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .slots
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
