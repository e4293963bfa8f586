//! linkedin-avatars - Connection profile-picture scraper
//!
//! Reads the exported connection list, scrapes each profile's picture URL
//! with a fresh headless Chrome per attempt, and appends results to the
//! checkpoint CSV. Safe to interrupt and re-run.
//!
//! Environment variables:
//! - `AVATARS_INPUT` - Input connection CSV (default: data/connections.csv)
//! - `AVATARS_OUTPUT` - Result CSV (default: data/pictures.csv)
//! - `AVATARS_COOKIES` - Cookie file from capture-cookies (default: linkedin_cookies.json)
//! - `AVATARS_USE_AUTH` - Inject saved cookies (default: true)
//! - `AVATARS_USE_PROXIES` - Rotate through a fetched proxy pool (default: false)
//! - `AVATARS_HEADLESS` - Headless Chrome (default: true)
//! - `AVATARS_MAX_RETRIES` - Attempts per profile (default: 3)

use std::time::Duration;

use tracing::info;

use linkedin_avatars::proxy::ProxyPool;
use linkedin_avatars::{pipeline, ScraperConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = linkedin_avatars::init_logging();

    info!("Starting linkedin-avatars");

    let config = ScraperConfig::from_env();
    info!(
        "Input: {}, output: {}, auth: {}, proxies: {}, headless: {}",
        config.input_path.display(),
        config.output_path.display(),
        config.use_auth,
        config.use_proxies,
        config.headless
    );

    let pool = if config.use_proxies {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;
        let pool = ProxyPool::fetch(&client, &config.proxy_list_url).await;
        if pool.is_empty() {
            info!("Proxy pool empty, continuing without proxies");
        }
        pool
    } else {
        ProxyPool::empty()
    };

    let summary = pipeline::run(&config, &pool).await?;

    info!(
        "Run finished: {} scraped, {} skipped, {} exhausted",
        summary.scraped, summary.skipped, summary.exhausted
    );
    Ok(())
}
