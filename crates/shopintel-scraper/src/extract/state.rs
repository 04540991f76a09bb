use shopintel_core::ExtractorName;

use super::ExtractorOutcome;
use crate::error::StateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    NotStarted,
    Running,
    Succeeded,
    PartiallySucceeded,
    Failed,
}

impl RunState {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Succeeded | RunState::PartiallySucceeded | RunState::Failed
        )
    }

    fn label(self) -> &'static str {
        match self {
            RunState::NotStarted => "not_started",
            RunState::Running => "running",
            RunState::Succeeded => "succeeded",
            RunState::PartiallySucceeded => "partially_succeeded",
            RunState::Failed => "failed",
        }
    }
}

/// Lifecycle of one extractor invocation: `NotStarted -> Running -> terminal`.
#[derive(Debug)]
pub struct ExtractorRun {
    extractor: ExtractorName,
    state: RunState,
}

impl ExtractorRun {
    #[must_use]
    pub fn new(extractor: ExtractorName) -> Self {
        Self {
            extractor,
            state: RunState::NotStarted,
        }
    }

    #[must_use]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// # Errors
    ///
    /// Returns [`StateError`] unless the run has not started yet.
    pub fn start(&mut self) -> Result<(), StateError> {
        self.advance(RunState::Running)
    }

    /// Records the terminal state matching `outcome`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError`] unless the run is currently `Running`.
    pub fn finish(&mut self, outcome: &ExtractorOutcome) -> Result<(), StateError> {
        let next = match outcome {
            ExtractorOutcome::Succeeded(_) => RunState::Succeeded,
            ExtractorOutcome::PartiallySucceeded { .. } => RunState::PartiallySucceeded,
            ExtractorOutcome::Failed(_) => RunState::Failed,
        };
        self.advance(next)
    }

    fn advance(&mut self, next: RunState) -> Result<(), StateError> {
        let allowed = match self.state {
            RunState::NotStarted => next == RunState::Running,
            RunState::Running => next.is_terminal(),
            _ => false,
        };
        if !allowed {
            return Err(StateError {
                extractor: self.extractor,
                from: self.state.label(),
                to: next.label(),
            });
        }
        self.state = next;
        Ok(())
    }
}
