//! Retry with exponential back-off and jitter for storefront requests.
//!
//! [`retry_with_backoff`] wraps one fetch attempt and retries on transient
//! failures: timeouts, connection errors and HTTP 5xx. Every 4xx response,
//! 429 included, and undecodable bodies are returned immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

const MAX_DELAY: Duration = Duration::from_secs(30);

pub(crate) fn is_retriable(err: &FetchError) -> bool {
    match err {
        FetchError::Timeout { .. } | FetchError::Connection { .. } => true,
        FetchError::HttpStatus { status, .. } => (500..600).contains(status),
        FetchError::ClientBuild(_) | FetchError::Decode { .. } | FetchError::InvalidPath { .. } => {
            false
        }
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors.
///
/// The n-th retry waits `backoff_base * 2^(n-1)` with ±25 % jitter, capped at
/// 30 s. A zero `backoff_base` retries without sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base: Duration,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let computed = backoff_base.saturating_mul(1u32 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY);
                let delay = capped.mul_f64(rand::random::<f64>() * 0.5 + 0.75);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "transient fetch error, retrying after back-off"
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn status(status: u16) -> FetchError {
        FetchError::HttpStatus {
            status,
            url: "https://shop.example.com/".to_owned(),
        }
    }

    #[test]
    fn classification_matches_transient_failures() {
        assert!(is_retriable(&FetchError::Timeout {
            url: "u".to_owned()
        }));
        assert!(is_retriable(&status(503)));
        assert!(!is_retriable(&status(429)));
        assert!(!is_retriable(&status(404)));
        assert!(!is_retriable(&status(403)));
        let decode = serde_json::from_str::<serde_json::Value>("<html>").unwrap_err();
        assert!(!is_retriable(&FetchError::Decode {
            url: "u".to_owned(),
            source: decode,
        }));
    }

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, Duration::ZERO, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(status(502))
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = retry_with_backoff(2, Duration::ZERO, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(status(503))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(FetchError::HttpStatus { status: 503, .. })
        ));
    }

    #[tokio::test]
    async fn rate_limited_responses_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = retry_with_backoff(2, Duration::ZERO, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(status(429))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(FetchError::HttpStatus { status: 429, .. })
        ));
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = retry_with_backoff(5, Duration::ZERO, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(status(404))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(result.is_err());
    }
}
