//! capture-cookies - One-time interactive cookie capture
//!
//! Opens a visible browser on the LinkedIn login page, waits for a manual
//! login (MFA included), then exports the session cookies to the cookie file
//! consumed by the scraper in headless mode.
//!
//! Environment variables:
//! - `AVATARS_COOKIES` - Output cookie file (default: linkedin_cookies.json)

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use linkedin_avatars::browser::BrowserSession;
use linkedin_avatars::ScraperConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _guard = linkedin_avatars::init_logging();

    let config = ScraperConfig::from_env();

    let session = BrowserSession::launch(false, None)
        .await
        .context("Failed to launch browser")?;

    // Close the browser before propagating any error, so a failed capture
    // never leaves a Chrome process behind.
    let result = capture(&session, &config).await;
    session.close().await;
    result
}

async fn capture(session: &BrowserSession, config: &ScraperConfig) -> anyhow::Result<()> {
    session
        .navigate("https://www.linkedin.com/login")
        .await
        .context("Failed to open login page")?;

    println!("Complete the login in the browser window, then press Enter...");
    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .context("Failed to read stdin")?;

    let cookies = session
        .export_cookies()
        .await
        .context("Failed to export cookies")?;

    let json = serde_json::to_string_pretty(&cookies)?;
    if let Some(parent) = config.cookie_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(&config.cookie_path, json)
        .with_context(|| format!("Failed to write {}", config.cookie_path.display()))?;

    info!(
        "Saved {} cookies to {}. The scraper can now run headless.",
        cookies.len(),
        config.cookie_path.display()
    );

    Ok(())
}
