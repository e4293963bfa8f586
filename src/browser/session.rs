//! Browser session management
//!
//! Launches and controls a single Chrome instance per scrape attempt. A
//! session is exclusively owned by the attempt that opened it; `close()`
//! consumes the session so a live browser can never leak across attempts.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chromiumoxide::cdp::browser_protocol::network::{Cookie, CookieParam};
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use tracing::{debug, info, warn};

use super::BrowserError;

/// Counter for sequential session naming (Session-1, Session-2, ...)
static SESSION_COUNTER: AtomicU32 = AtomicU32::new(1);

/// Window size passed to Chrome; matches a common desktop viewport.
const WINDOW_WIDTH: u32 = 1920;
const WINDOW_HEIGHT: u32 = 1080;

/// Interval between element-presence polls.
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Find Chrome/Chromium executable on the system
fn find_chrome() -> Option<std::path::PathBuf> {
    let candidates: Vec<std::path::PathBuf> = if cfg!(target_os = "windows") {
        let mut paths = vec![
            std::path::PathBuf::from(r"C:\Program Files\Google\Chrome\Application\chrome.exe"),
            std::path::PathBuf::from(r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe"),
        ];
        if let Ok(local) = std::env::var("LOCALAPPDATA") {
            paths.push(std::path::PathBuf::from(format!(
                r"{}\Google\Chrome\Application\chrome.exe",
                local
            )));
        }
        paths
    } else if cfg!(target_os = "macos") {
        vec![std::path::PathBuf::from(
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        )]
    } else {
        vec![
            std::path::PathBuf::from("/usr/bin/google-chrome"),
            std::path::PathBuf::from("/usr/bin/google-chrome-stable"),
            std::path::PathBuf::from("/usr/bin/chromium"),
            std::path::PathBuf::from("/usr/bin/chromium-browser"),
        ]
    };

    candidates.into_iter().find(|p| p.exists())
}

/// A browser session for one scrape attempt
pub struct BrowserSession {
    /// Display name (e.g. "Session-1")
    id: String,
    /// The browser instance; taken out on close
    browser: Option<Browser>,
    /// The single page driven by this session
    page: Page,
    /// Set to false when Chrome disconnects
    alive: Arc<AtomicBool>,
}

impl BrowserSession {
    /// Launch a fresh Chrome instance.
    ///
    /// `proxy` is a `host:port` entry passed to Chrome via `--proxy-server`.
    pub async fn launch(headless: bool, proxy: Option<&str>) -> Result<Self, BrowserError> {
        let session_id = format!("Session-{}", SESSION_COUNTER.fetch_add(1, Ordering::Relaxed));

        info!("Launching browser session {} (headless: {})", session_id, headless);

        let chrome_path = find_chrome().ok_or_else(|| {
            BrowserError::LaunchFailed(
                "Chrome/Chromium not found. Install Chrome and retry.".to_string(),
            )
        })?;
        debug!("Using Chrome at: {}", chrome_path.display());

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .window_size(WINDOW_WIDTH, WINDOW_HEIGHT)
            // Anti-detection (undetected-chromedriver style)
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--disable-infobars")
            .arg("--no-default-browser-check")
            .arg("--no-first-run")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-gpu")
            .arg("--disable-notifications")
            .arg("--disable-translate")
            .arg("--disable-background-networking")
            .arg("--mute-audio")
            // Required when running as root (e.g. in Docker or on a VPS)
            .arg("--no-sandbox");

        if headless {
            // Modern Chrome requires --headless=new for proper headless
            builder = builder.arg("--headless=new");
        } else {
            builder = builder.with_head();
        }

        if let Some(proxy) = proxy {
            info!("Session {} using proxy: {}", session_id, proxy);
            builder = builder.arg(format!("--proxy-server=http://{}", proxy));
        }

        let browser_config = builder
            .build()
            .map_err(BrowserError::LaunchFailed)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        // Spawn handler in background — when the handler ends, Chrome has
        // disconnected
        let alive = Arc::new(AtomicBool::new(true));
        let alive_for_handler = alive.clone();
        let session_id_clone = session_id.clone();
        tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("Session {} browser event error: {}", session_id_clone, e);
                }
            }
            warn!("Session {} Chrome disconnected (event handler ended)", session_id_clone);
            alive_for_handler.store(false, Ordering::Relaxed);
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::LaunchFailed(e.to_string()))?;

        info!("Browser session {} created", session_id);

        Ok(Self {
            id: session_id,
            browser: Some(browser),
            page,
            alive,
        })
    }

    /// Get session ID
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Check if the session is alive
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Relaxed)
    }

    /// Navigate to a URL and wait for the navigation to complete
    pub async fn navigate(&self, url: &str) -> Result<(), BrowserError> {
        debug!("Session {} navigating to: {}", self.id, url);
        self.page
            .goto(url)
            .await
            .map_err(|e| BrowserError::NavigationFailed(e.to_string()))?;

        // Best-effort: slow pages are covered by the element-presence wait
        // downstream, so a navigation-event timeout is not an error here.
        if tokio::time::timeout(Duration::from_secs(30), self.page.wait_for_navigation())
            .await
            .is_err()
        {
            debug!("Session {} navigation event timed out for {}", self.id, url);
        }

        Ok(())
    }

    /// Get current URL
    pub async fn current_url(&self) -> Result<String, BrowserError> {
        self.page
            .url()
            .await
            .map_err(|e| BrowserError::ConnectionLost(e.to_string()))?
            .ok_or_else(|| BrowserError::ConnectionLost("No URL".into()))
    }

    /// Wait for any of the given selectors to appear, polling until `timeout`.
    ///
    /// Returns the first matching element, or `Timeout` when the deadline
    /// passes with no match.
    pub async fn wait_for_element(
        &self,
        selectors: &[&str],
        timeout: Duration,
    ) -> Result<Element, BrowserError> {
        let deadline = Instant::now() + timeout;

        loop {
            for selector in selectors {
                if let Ok(element) = self.page.find_element(*selector).await {
                    debug!("Session {} matched selector: {}", self.id, selector);
                    return Ok(element);
                }
            }

            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout(format!(
                    "No match for {:?} within {:?}",
                    selectors, timeout
                )));
            }

            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Click on an element by selector
    pub async fn click(&self, selector: &str) -> Result<(), BrowserError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|e| BrowserError::ElementNotFound(format!("{}: {}", selector, e)))?;

        element
            .click()
            .await
            .map_err(|e| BrowserError::CommandFailed(e.to_string()))?;

        Ok(())
    }

    /// Set a single cookie on the session
    pub async fn set_cookie(&self, cookie: CookieParam) -> Result<(), BrowserError> {
        self.page
            .set_cookie(cookie)
            .await
            .map_err(|e| BrowserError::CommandFailed(e.to_string()))?;
        Ok(())
    }

    /// Export all cookies currently held by the browser
    pub async fn export_cookies(&self) -> Result<Vec<Cookie>, BrowserError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| BrowserError::ConnectionLost("Browser already closed".into()))?;

        browser
            .get_cookies()
            .await
            .map_err(|e| BrowserError::CommandFailed(e.to_string()))
    }

    /// Close the browser session, terminating the Chrome process.
    ///
    /// Consumes the session; tries a graceful close first, then force-kills
    /// so no Chrome child processes linger.
    pub async fn close(mut self) {
        self.alive.store(false, Ordering::Relaxed);

        let _ = self.page.clone().close().await;

        if let Some(mut browser) = self.browser.take() {
            // Graceful close sends the Browser.close CDP command
            let _ = browser.close().await;
            // Brief grace period for Chrome child processes to exit
            tokio::time::sleep(Duration::from_millis(500)).await;
            let _ = browser.kill().await;
        }

        info!("Browser session {} closed", self.id);
    }
}
