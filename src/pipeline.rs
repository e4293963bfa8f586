//! Pipeline driver
//!
//! Single sequential pass over the input connection list: consult the
//! checkpoint, fetch each unseen profile through the retry loop, persist
//! successes immediately, and pace between records. One profile is fully
//! resolved (retries included) before the next begins.

use std::future::Future;

use anyhow::Context;
use tracing::{debug, info, warn};

use crate::checkpoint::CheckpointStore;
use crate::pacing;
use crate::proxy::ProxyPool;
use crate::scraper::{fetch_profile_picture, FetchOutcome};
use crate::ScraperConfig;

/// Zero-based index of the profile-URL field in an input row
const PROFILE_URL_FIELD: usize = 2;

/// Minimum field count for a well-formed input row
const MIN_FIELDS: usize = 3;

/// Counters for one pipeline run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Profiles fetched and appended this run
    pub scraped: usize,
    /// Rows skipped: already processed, empty URL, or malformed
    pub skipped: usize,
    /// Profiles that exhausted their retries
    pub exhausted: usize,
}

/// Run the pipeline with the real browser-backed fetcher.
pub async fn run(config: &ScraperConfig, pool: &ProxyPool) -> anyhow::Result<RunSummary> {
    run_with(config, |profile_url| {
        let config = config;
        let pool = pool;
        async move { fetch_profile_picture(config, pool, &profile_url).await }
    })
    .await
}

/// Run the pipeline with an arbitrary per-profile fetcher.
///
/// Split out from `run` so the driver's skip/append/pacing behavior is
/// testable without Chrome.
pub async fn run_with<F, Fut>(config: &ScraperConfig, mut fetch: F) -> anyhow::Result<RunSummary>
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = FetchOutcome>,
{
    let store = CheckpointStore::new(&config.output_path);
    let mut processed = store.load_processed()?;
    if !processed.is_empty() {
        info!("Resuming: {} profiles already processed", processed.len());
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(&config.input_path)
        .with_context(|| format!("Failed to open input {}", config.input_path.display()))?;

    let mut summary = RunSummary::default();

    for result in reader.records() {
        let record = result.context("Failed to read input row")?;

        if record.len() < MIN_FIELDS {
            debug!("Skipping malformed row with {} fields", record.len());
            summary.skipped += 1;
            continue;
        }

        let profile_url = record
            .get(PROFILE_URL_FIELD)
            .unwrap_or_default()
            .trim()
            .to_string();

        if profile_url.is_empty() {
            debug!("Skipping row with empty profile URL");
            summary.skipped += 1;
            continue;
        }

        if processed.contains(&profile_url) {
            info!("Skipping {}, already processed", profile_url);
            summary.skipped += 1;
            continue;
        }

        info!("Processing {}", profile_url);

        match fetch(profile_url.clone()).await {
            FetchOutcome::Success(picture_url) => {
                store.append(&profile_url, &picture_url)?;
                processed.insert(profile_url);
                summary.scraped += 1;
                info!("Saved: {}", picture_url);
            }
            FetchOutcome::Exhausted => {
                warn!("Skipping {} after repeated failures", profile_url);
                summary.exhausted += 1;
            }
        }

        // Human-cadence gap between profiles, applied regardless of outcome
        pacing::jitter_delay(5, 15).await;
    }

    info!(
        "Processing complete: {} scraped, {} skipped, {} exhausted ({})",
        summary.scraped,
        summary.skipped,
        summary.exhausted,
        config.output_path.display()
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_in(dir: &tempfile::TempDir, input: &str) -> ScraperConfig {
        let input_path = dir.path().join("connections.csv");
        std::fs::write(&input_path, input).unwrap();
        ScraperConfig {
            input_path,
            output_path: dir.path().join("pictures.csv"),
            ..ScraperConfig::default()
        }
    }

    fn fixed_fetcher(
        pictures: HashMap<&'static str, &'static str>,
    ) -> impl FnMut(String) -> std::future::Ready<FetchOutcome> {
        move |url: String| {
            std::future::ready(match pictures.get(url.as_str()) {
                Some(picture) => FetchOutcome::Success(picture.to_string()),
                None => FetchOutcome::Exhausted,
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_and_exhaustion_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(
            &dir,
            "First Name,Last Name,URL\n\
             a,b,https://site/in/alice\n\
             a,b,https://site/in/bob\n",
        );

        let summary = run_with(
            &config,
            fixed_fetcher(HashMap::from([(
                "https://site/in/alice",
                "https://img/alice.jpg",
            )])),
        )
        .await
        .unwrap();

        assert_eq!(summary.scraped, 1);
        assert_eq!(summary.exhausted, 1);

        let output = std::fs::read_to_string(&config.output_path).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "profile_url,profile_picture_url");
        assert_eq!(lines[1], "https://site/in/alice,https://img/alice.jpg");
    }

    #[tokio::test(start_paused = true)]
    async fn test_rerun_does_not_duplicate_rows() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(
            &dir,
            "First Name,Last Name,URL\n\
             a,b,https://site/in/alice\n\
             a,b,https://site/in/bob\n",
        );

        let pictures = HashMap::from([
            ("https://site/in/alice", "https://img/alice.jpg"),
            ("https://site/in/bob", "https://img/bob.jpg"),
        ]);

        let first = run_with(&config, fixed_fetcher(pictures.clone())).await.unwrap();
        assert_eq!(first.scraped, 2);

        let second = run_with(&config, fixed_fetcher(pictures)).await.unwrap();
        assert_eq!(second.scraped, 0);
        assert_eq!(second.skipped, 2);

        let output = std::fs::read_to_string(&config.output_path).unwrap();
        assert_eq!(output.lines().count(), 3);
        assert_eq!(output.matches("https://site/in/alice").count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_and_empty_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(
            &dir,
            "First Name,Last Name,URL\n\
             only-two,fields\n\
             a,b,\n\
             a,b,https://site/in/alice\n",
        );

        let summary = run_with(
            &config,
            fixed_fetcher(HashMap::from([(
                "https://site/in/alice",
                "https://img/alice.jpg",
            )])),
        )
        .await
        .unwrap();

        assert_eq!(summary.scraped, 1);
        assert_eq!(summary.skipped, 2);
        assert_eq!(summary.exhausted, 0);

        let output = std::fs::read_to_string(&config.output_path).unwrap();
        assert_eq!(output.lines().count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_duplicate_input_rows_processed_once_within_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(
            &dir,
            "First Name,Last Name,URL\n\
             a,b,https://site/in/alice\n\
             a,b,https://site/in/alice\n",
        );

        let summary = run_with(
            &config,
            fixed_fetcher(HashMap::from([(
                "https://site/in/alice",
                "https://img/alice.jpg",
            )])),
        )
        .await
        .unwrap();

        assert_eq!(summary.scraped, 1);
        assert_eq!(summary.skipped, 1);

        let output = std::fs::read_to_string(&config.output_path).unwrap();
        assert_eq!(output.matches("https://site/in/alice").count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_input_aborts_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = ScraperConfig {
            input_path: dir.path().join("nope.csv"),
            output_path: dir.path().join("pictures.csv"),
            ..ScraperConfig::default()
        };

        let result = run_with(&config, fixed_fetcher(HashMap::new())).await;
        assert!(result.is_err());
    }
}
