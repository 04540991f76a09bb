use thiserror::Error;

use crate::job::TargetStatus;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid target \"{input}\": {reason}")]
    InvalidTarget { input: String, reason: String },

    #[error("bulk entry {index} out of range (job has {len} targets)")]
    EntryOutOfRange { index: usize, len: usize },

    #[error("invalid status transition {from:?} -> {to:?} for {target}")]
    InvalidTransition {
        target: String,
        from: TargetStatus,
        to: TargetStatus,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for env var {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
