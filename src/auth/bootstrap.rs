//! Session bootstrap
//!
//! Establishes an authenticated or anonymous browsing session. Authenticated
//! sessions replay the persisted cookie jar into a fresh browser; anonymous
//! sessions rely on `dismiss_login_overlay` to swat away the interstitial
//! sign-in modal when LinkedIn shows one.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::auth::cookies::{load_cookie_file, StoredCookie};
use crate::browser::{BrowserError, BrowserSession, ScrapeError};
use crate::{pacing, ScraperConfig};

/// Site root navigated to before cookie injection; cookies can only be set
/// against their own origin.
pub const SITE_ROOT: &str = "https://www.linkedin.com";

/// Dismiss controls for the anonymous-mode sign-in overlay. Markup varies
/// between rollouts, so both known variants are tried.
const DISMISS_SELECTORS: [&str; 2] = [
    "button.modal__dismiss",
    "button.contextual-sign-in-modal__modal-dismiss",
];

/// Bounded time for locating and clicking the overlay dismiss control.
const DISMISS_TIMEOUT: Duration = Duration::from_secs(5);

/// Open a fresh browser session per the scraper configuration.
///
/// The cookie file is read before Chrome is launched so a missing/corrupt
/// file fails fast without ever acquiring a browser. On any failure after
/// launch the session is torn down before the error is returned — the caller
/// never sees a live session alongside an `Err`.
pub async fn open_session(
    config: &ScraperConfig,
    proxy: Option<&str>,
) -> Result<BrowserSession, ScrapeError> {
    let cookies = if config.use_auth {
        Some(load_cookie_file(&config.cookie_path)?)
    } else {
        None
    };

    let session = BrowserSession::launch(config.headless, proxy).await?;

    if let Some(cookies) = cookies {
        if let Err(e) = inject_cookies(&session, &cookies).await {
            session.close().await;
            return Err(e.into());
        }
    }

    Ok(session)
}

/// Replay the cookie jar into the session.
///
/// A small randomized delay between injections keeps the CDP traffic from
/// looking like a single mechanical burst.
async fn inject_cookies(
    session: &BrowserSession,
    cookies: &[StoredCookie],
) -> Result<(), BrowserError> {
    session.navigate(SITE_ROOT).await?;
    pacing::jitter_delay(5, 10).await;

    let mut injected = 0usize;
    for cookie in cookies {
        let Some(param) = cookie.to_param() else {
            warn!("Skipping cookie with no name or domain");
            continue;
        };

        session.set_cookie(param).await?;
        injected += 1;
        pacing::jitter_delay_ms(50, 250).await;
    }

    info!("Session {} injected {} cookies", session.id(), injected);
    Ok(())
}

/// Best-effort dismissal of the anonymous-mode login overlay.
///
/// Overlay absence is the normal case, not an error — every failure here is
/// swallowed.
pub async fn dismiss_login_overlay(session: &BrowserSession) {
    pacing::jitter_delay(1, 2).await;

    for selector in DISMISS_SELECTORS {
        match tokio::time::timeout(DISMISS_TIMEOUT, session.click(selector)).await {
            Ok(Ok(())) => {
                debug!("Session {} dismissed login overlay via {}", session.id(), selector);
                return;
            }
            Ok(Err(e)) => debug!("Overlay dismiss via {} failed: {}", selector, e),
            Err(_) => debug!("Overlay dismiss via {} timed out", selector),
        }
    }

    debug!("Session {} had no login overlay to dismiss", session.id());
}
