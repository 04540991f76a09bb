//! HTTP access to one storefront origin.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use reqwest::{header, redirect, Client};
use serde_json::Value;
use shopintel_core::{AppConfig, Target};
use tokio::time::Instant;

use crate::error::FetchError;
use crate::retry::retry_with_backoff;

const MAX_REDIRECTS: usize = 10;
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Transport settings shared by every [`Fetcher`] built from one config.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub user_agent: String,
    /// Additional attempts after the first failure for retriable errors.
    pub max_retries: u32,
    pub backoff_base: Duration,
    /// Minimum spacing between request starts against one origin.
    pub inter_request_delay: Duration,
}

impl FetchConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            connect_timeout: CONNECT_TIMEOUT,
            user_agent: config.user_agent.clone(),
            max_retries: config.max_retries,
            backoff_base: Duration::from_millis(config.retry_backoff_base_ms),
            inter_request_delay: Duration::from_millis(config.inter_request_delay_ms),
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            connect_timeout: CONNECT_TIMEOUT,
            user_agent: "shopintel/0.1 (brand-insights)".to_owned(),
            max_retries: 2,
            backoff_base: Duration::from_millis(500),
            inter_request_delay: Duration::from_millis(250),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expect {
    Json,
    Html,
}

impl Expect {
    fn accept_header(self) -> &'static str {
        match self {
            Expect::Json => "application/json",
            Expect::Html => "text/html,application/xhtml+xml",
        }
    }
}

#[derive(Debug, Clone)]
pub enum Payload {
    Json(Value),
    Html(String),
}

/// Spaces request starts at least `interval` apart.
///
/// The next free slot is reserved while holding the lock; the wait happens
/// after the guard is dropped.
#[derive(Debug)]
struct Pacer {
    interval: Duration,
    next_slot: Mutex<Option<Instant>>,
}

impl Pacer {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_slot: Mutex::new(None),
        }
    }

    async fn wait_turn(&self) {
        if self.interval.is_zero() {
            return;
        }
        let slot = {
            let mut next = self
                .next_slot
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            let now = Instant::now();
            let slot = next.map_or(now, |n| n.max(now));
            *next = Some(slot + self.interval);
            slot
        };
        tokio::time::sleep_until(slot).await;
    }
}

/// Rate-limited, retrying HTTP client bound to one [`Target`].
///
/// One `reqwest::Client` (and therefore one connection pool) per target.
/// Safe to share by reference across concurrently running extractors.
#[derive(Debug)]
pub struct Fetcher {
    target: Target,
    client: Client,
    max_retries: u32,
    backoff_base: Duration,
    pacer: Pacer,
}

impl Fetcher {
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(target: Target, config: &FetchConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self {
            target,
            client,
            max_retries: config.max_retries,
            backoff_base: config.backoff_base,
            pacer: Pacer::new(config.inter_request_delay),
        })
    }

    #[must_use]
    pub fn target(&self) -> &Target {
        &self.target
    }

    /// GETs a root-relative `path` on the target, retrying transient failures.
    ///
    /// # Errors
    ///
    /// - [`FetchError::InvalidPath`] if `path` does not start with `/`.
    /// - [`FetchError::HttpStatus`] for any non-2xx final response.
    /// - [`FetchError::Timeout`] / [`FetchError::Connection`] after retries.
    /// - [`FetchError::Decode`] if `expect` is JSON and the body does not parse.
    pub async fn fetch(&self, path: &str, expect: Expect) -> Result<Payload, FetchError> {
        let (url, body) = self.get(path, expect).await?;
        match expect {
            Expect::Json => serde_json::from_slice::<Value>(&body)
                .map(Payload::Json)
                .map_err(|source| FetchError::Decode { url, source }),
            Expect::Html => Ok(Payload::Html(String::from_utf8_lossy(&body).into_owned())),
        }
    }

    /// # Errors
    ///
    /// Same as [`Fetcher::fetch`].
    pub async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        let (url, body) = self.get(path, Expect::Json).await?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { url, source })
    }

    /// # Errors
    ///
    /// Same as [`Fetcher::fetch`], minus decoding.
    pub async fn fetch_html(&self, path: &str) -> Result<String, FetchError> {
        let (_, body) = self.get(path, Expect::Html).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    async fn get(&self, path: &str, expect: Expect) -> Result<(String, Vec<u8>), FetchError> {
        if !path.starts_with('/') {
            return Err(FetchError::InvalidPath {
                path: path.to_owned(),
            });
        }
        let url = self.target.url_for(path);

        retry_with_backoff(self.max_retries, self.backoff_base, || {
            let url = url.clone();
            async move {
                self.pacer.wait_turn().await;
                tracing::debug!(url = %url, ?expect, "fetching");

                let response = self
                    .client
                    .get(&url)
                    .header(header::ACCEPT, expect.accept_header())
                    .send()
                    .await
                    .map_err(|e| FetchError::from_transport(&url, e))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(FetchError::HttpStatus {
                        status: status.as_u16(),
                        url,
                    });
                }

                let body = response
                    .bytes()
                    .await
                    .map_err(|e| FetchError::from_transport(&url, e))?;
                Ok((url, body.to_vec()))
            }
        })
        .await
    }

    /// Checks that the origin answers at all.
    ///
    /// Any HTTP response, even an error status, counts as reachable.
    ///
    /// # Errors
    ///
    /// Returns the final network error when the origin never responds.
    pub async fn probe(&self) -> Result<(), FetchError> {
        match self.fetch("/", Expect::Html).await {
            Ok(_) | Err(FetchError::HttpStatus { .. }) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn relative_path_is_rejected_without_a_request() {
        let target = Target::parse("http://127.0.0.1:9").unwrap();
        let fetcher = Fetcher::new(target, &FetchConfig::default()).unwrap();
        let err = fetcher.fetch("products.json", Expect::Json).await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidPath { .. }));
    }

    #[tokio::test]
    async fn pacer_spaces_request_starts() {
        let pacer = Pacer::new(Duration::from_millis(50));
        let start = Instant::now();
        pacer.wait_turn().await;
        pacer.wait_turn().await;
        pacer.wait_turn().await;
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn zero_interval_pacer_never_waits() {
        let pacer = Pacer::new(Duration::ZERO);
        let start = Instant::now();
        for _ in 0..10 {
            pacer.wait_turn().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
