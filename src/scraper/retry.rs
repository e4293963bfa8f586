//! Bounded retry around a single profile fetch
//!
//! Each attempt gets a brand-new browser session — never reused — and the
//! session is closed on every exit path before the loop sleeps or returns.
//! Failures back off exponentially with jitter; a fully exhausted profile is
//! an outcome, not an error.

use std::future::Future;

use tracing::{error, warn};

use crate::auth;
use crate::browser::ScrapeError;
use crate::pacing;
use crate::proxy::ProxyPool;
use crate::scraper::extract::extract_picture;
use crate::ScraperConfig;

/// Terminal result of the retry loop for one profile
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Picture URL successfully extracted
    Success(String),
    /// All attempts failed, or a fatal configuration error aborted the loop
    Exhausted,
}

/// Fetch one profile's picture URL with up to `max_retries` attempts.
pub async fn fetch_profile_picture(
    config: &ScraperConfig,
    pool: &ProxyPool,
    profile_url: &str,
) -> FetchOutcome {
    run_attempts(config.max_retries, |_attempt| {
        let config = config;
        let pool = pool;
        async move {
            pacing::jitter_delay(3, 8).await;

            let proxy = if config.use_proxies {
                pool.pick_random()
            } else {
                None
            };

            let session = auth::open_session(config, proxy).await?;
            let result = extract_picture(&session, profile_url, config.use_auth).await;
            session.close().await;
            result
        }
    })
    .await
}

/// Drive the attempt loop over an arbitrary attempt future.
///
/// A login-wall redirect consumes an attempt like any other failure even
/// though retrying it rarely helps; only fatal errors (missing cookie file)
/// short-circuit, since they cannot clear mid-loop. Backoff is slept after
/// every failure, including the last.
async fn run_attempts<F, Fut>(max_retries: u32, mut attempt: F) -> FetchOutcome
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<String, ScrapeError>>,
{
    for n in 0..max_retries {
        match attempt(n).await {
            Ok(picture_url) => return FetchOutcome::Success(picture_url),
            Err(e) if e.is_fatal() => {
                error!("Aborting profile, configuration error: {}", e);
                return FetchOutcome::Exhausted;
            }
            Err(e) => {
                warn!("Error retrieving picture: {} (attempt {}/{})", e, n + 1, max_retries);
                pacing::backoff_with_jitter(n).await;
            }
        }
    }

    FetchOutcome::Exhausted
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_always_failing_attempts_run_exactly_bound_times() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_seen = calls.clone();

        let outcome = run_attempts(3, move |_| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ScrapeError::ElementNotFound("img".into()))
            }
        })
        .await;

        assert_eq!(outcome, FetchOutcome::Exhausted);
        assert_eq!(calls_seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_returns_without_further_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_seen = calls.clone();

        let outcome = run_attempts(3, move |_| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("https://img/alice.jpg".to_string())
            }
        })
        .await;

        assert_eq!(outcome, FetchOutcome::Success("https://img/alice.jpg".to_string()));
        assert_eq!(calls_seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_seen = calls.clone();

        let outcome = run_attempts(3, move |_| {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(ScrapeError::LoginWall("https://www.linkedin.com/authwall".into()))
                } else {
                    Ok("https://img/bob.jpg".to_string())
                }
            }
        })
        .await;

        assert_eq!(outcome, FetchOutcome::Success("https://img/bob.jpg".to_string()));
        assert_eq!(calls_seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fatal_error_short_circuits() {
        let calls = Arc::new(AtomicU32::new(0));
        let calls_seen = calls.clone();

        let outcome = run_attempts(3, move |_| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ScrapeError::MissingCookies(PathBuf::from("cookies.json")))
            }
        })
        .await;

        assert_eq!(outcome, FetchOutcome::Exhausted);
        assert_eq!(calls_seen.load(Ordering::SeqCst), 1);
    }
}
