use thiserror::Error;

#[derive(Debug, Error)]
pub enum NormalizerError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("text structurer unavailable: {0}")]
    Unavailable(String),

    #[error("text structurer timed out")]
    Timeout,

    #[error("text structurer returned an unusable response: {0}")]
    BadResponse(String),
}
