//! linkedin-avatars
//!
//! Scrapes profile-picture URLs for a list of LinkedIn connection profiles
//! with an automated Chrome browser, checkpointing results to an append-only
//! CSV so the job can be paused, resumed, and re-run without duplicating
//! work.

pub mod auth;
pub mod browser;
pub mod checkpoint;
pub mod pacing;
pub mod pipeline;
pub mod proxy;
pub mod scraper;

use std::path::PathBuf;

use tracing::info;

/// Scraper configuration
///
/// All tunables are construction-time values; there are no CLI flags. `main`
/// applies `AVATARS_*` environment overrides on top of the defaults.
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Input connection list (CSV, profile URL in the third field)
    pub input_path: PathBuf,
    /// Append-only result file
    pub output_path: PathBuf,
    /// Persisted auth cookies from `capture-cookies`
    pub cookie_path: PathBuf,
    /// Inject the persisted cookies into each session
    pub use_auth: bool,
    /// Route each session through a random proxy from the pool
    pub use_proxies: bool,
    /// Run Chrome headless
    pub headless: bool,
    /// Attempts per profile before giving up
    pub max_retries: u32,
    /// Public listing endpoint for the proxy pool
    pub proxy_list_url: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("data/connections.csv"),
            output_path: PathBuf::from("data/pictures.csv"),
            cookie_path: PathBuf::from("linkedin_cookies.json"),
            use_auth: true,
            use_proxies: false,
            headless: true,
            max_retries: 3,
            proxy_list_url: proxy::DEFAULT_LIST_URL.to_string(),
        }
    }
}

impl ScraperConfig {
    /// Defaults with `AVATARS_*` environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("AVATARS_INPUT") {
            config.input_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("AVATARS_OUTPUT") {
            config.output_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("AVATARS_COOKIES") {
            config.cookie_path = PathBuf::from(path);
        }
        if let Some(v) = env_bool("AVATARS_USE_AUTH") {
            config.use_auth = v;
        }
        if let Some(v) = env_bool("AVATARS_USE_PROXIES") {
            config.use_proxies = v;
        }
        if let Some(v) = env_bool("AVATARS_HEADLESS") {
            config.headless = v;
        }
        if let Some(n) = std::env::var("AVATARS_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_retries = n;
        }
        if let Ok(url) = std::env::var("AVATARS_PROXY_LIST_URL") {
            config.proxy_list_url = url;
        }

        config
    }
}

fn env_bool(name: &str) -> Option<bool> {
    std::env::var(name)
        .ok()
        .and_then(|v| match v.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => Some(true),
            "0" | "false" | "no" => Some(false),
            _ => None,
        })
}

/// Get log directory path (shared across modules)
pub fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("linkedin-avatars").join("logs"))
}

/// Initialize logging (shared between the scraper and capture-cookies bins)
pub fn init_logging() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let console_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(false);

    if let Some(log_dir) = log_dir() {
        let _ = std::fs::create_dir_all(&log_dir);
        let file_appender = tracing_appender::rolling::daily(&log_dir, "linkedin-avatars.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_target(true)
            .with_writer(non_blocking);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .init();

        info!("Log files saved to: {}", log_dir.display());
        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .init();

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ScraperConfig::default();
        assert_eq!(config.max_retries, 3);
        assert!(config.use_auth);
        assert!(!config.use_proxies);
        assert!(config.headless);
    }
}
