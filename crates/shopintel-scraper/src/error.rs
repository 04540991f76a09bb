use shopintel_core::{ExtractorName, FailureReason, Target};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("request to {url} timed out")]
    Timeout { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("connection to {url} failed: {source}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid request path \"{path}\": must be root-relative")]
    InvalidPath { path: String },
}

impl FetchError {
    /// Classifies a transport-level `reqwest` error for `url`.
    pub(crate) fn from_transport(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_owned(),
            }
        } else {
            Self::Connection {
                url: url.to_owned(),
                source,
            }
        }
    }

    /// `true` for failures that mean the host could not be talked to at all.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. } | Self::Connection { .. } | Self::ClientBuild(_)
        )
    }

    /// The reason recorded in [`shopintel_core::BrandInsights::failures`].
    #[must_use]
    pub fn failure_reason(&self) -> FailureReason {
        match self {
            Self::Timeout { .. } => FailureReason::Timeout,
            Self::HttpStatus { status, .. } => FailureReason::HttpError { status: *status },
            Self::Connection { .. } | Self::ClientBuild(_) => FailureReason::ConnectionError,
            Self::Decode { source, .. } => FailureReason::MalformedData {
                detail: source.to_string(),
            },
            Self::InvalidPath { path } => FailureReason::MalformedData {
                detail: format!("invalid path {path}"),
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum AggregateError {
    #[error("target {target} is unreachable: {source}")]
    TargetUnreachable {
        target: Target,
        #[source]
        source: FetchError,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Illegal move in an extractor run's lifecycle.
#[derive(Debug, Error)]
#[error("{extractor}: cannot move from {from} to {to}")]
pub struct StateError {
    pub extractor: ExtractorName,
    pub from: &'static str,
    pub to: &'static str,
}
