//! Retry with exponential backoff for transient storefront errors.
//!
//! Non-retriable errors (parse failures, 404s, non-5xx statuses) are
//! propagated immediately without retrying.

use std::future::Future;
use std::time::Duration;

use crate::error::StorefrontError;

/// Returns `true` if `err` represents a transient condition worth retrying
/// after a backoff delay.
///
/// Retriable:
/// - [`StorefrontError::RateLimited`] — HTTP 429; the server asked us to back off.
/// - [`StorefrontError::Http`] — network-level failure (connection reset, timeout).
/// - [`StorefrontError::UnexpectedStatus`] with a 5xx status — transient server error.
///
/// Non-retriable (propagated immediately):
/// - [`StorefrontError::NotFound`] — retrying would return the same result.
/// - [`StorefrontError::UnexpectedStatus`] with a 4xx status — a request problem.
/// - [`StorefrontError::Deserialize`] — the body does not parse; retrying won't fix it.
/// - [`StorefrontError::InvalidDomain`] — a configuration problem.
fn is_retriable(err: &StorefrontError) -> bool {
    match err {
        StorefrontError::RateLimited { .. } | StorefrontError::Http(_) => true,
        StorefrontError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        StorefrontError::NotFound { .. }
        | StorefrontError::Deserialize { .. }
        | StorefrontError::InvalidDomain { .. } => false,
    }
}

/// Executes `operation` with exponential backoff retries on transient errors.
///
/// On a retriable error the function sleeps `backoff_base_ms * 2^attempt`
/// milliseconds and tries again, up to `max_retries` additional attempts
/// after the first try. If all retries are exhausted the last error is
/// returned. Non-retriable errors return immediately without sleeping.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, StorefrontError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StorefrontError>>,
{
    let mut attempt = 0u32;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }

                let delay_ms = backoff_base_ms.saturating_mul(1u64 << attempt.min(10));
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient storefront error — retrying after backoff"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn server_error(status: u16) -> StorefrontError {
        StorefrontError::UnexpectedStatus {
            status,
            url: "https://shop.example.com/products.json".to_owned(),
        }
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, StorefrontError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_rate_limited_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                if c.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(StorefrontError::RateLimited {
                        retry_after_secs: 0,
                    })
                } else {
                    Ok::<u32, StorefrontError>(99)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 99);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn retries_5xx_but_not_4xx() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, StorefrontError>(server_error(503))
            }
        })
        .await;
        // max_retries=2 → 3 total attempts
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(
            result,
            Err(StorefrontError::UnexpectedStatus { status: 503, .. })
        ));

        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, StorefrontError>(server_error(403))
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(
            result,
            Err(StorefrontError::UnexpectedStatus { status: 403, .. })
        ));
    }

    #[tokio::test]
    async fn does_not_retry_not_found() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err::<u32, StorefrontError>(StorefrontError::NotFound {
                    url: "https://shop.example.com/products.json".to_owned(),
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(StorefrontError::NotFound { .. })));
    }
}
