use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub inter_request_delay_ms: u64,
    pub max_concurrent_targets: usize,
    /// Default catalog cap applied when a request does not set `max_products`.
    pub max_products: usize,
    /// Endpoint of the external text-structuring service. `None` disables
    /// the HTTP collaborator.
    pub normalizer_url: Option<String>,
    pub normalizer_api_key: Option<String>,
    pub normalizer_timeout_secs: u64,
    pub competitors_path: PathBuf,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("inter_request_delay_ms", &self.inter_request_delay_ms)
            .field("max_concurrent_targets", &self.max_concurrent_targets)
            .field("max_products", &self.max_products)
            .field("normalizer_url", &self.normalizer_url)
            .field(
                "normalizer_api_key",
                &self.normalizer_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("normalizer_timeout_secs", &self.normalizer_timeout_secs)
            .field("competitors_path", &self.competitors_path)
            .finish()
    }
}
