//! Profile-picture extraction
//!
//! Drives a live session to a profile page and pulls the picture URL out of
//! the DOM. Both the image selectors and the login-wall URL patterns are
//! unstable contract surfaces — LinkedIn changes them without notice.

use std::time::Duration;

use tracing::{debug, info};

use crate::auth;
use crate::browser::{BrowserError, BrowserSession, ScrapeError};
use crate::pacing;

/// Bounded wait for the picture element to render
const PICTURE_TIMEOUT: Duration = Duration::from_secs(10);

/// Known markup variants for the profile picture
const PICTURE_SELECTORS: [&str; 2] = [
    "img.presence-entity__image",
    "img.pv-top-card-profile-picture__image",
];

/// Leading path segments indicating a redirect away from the profile to a
/// sign-in or challenge page
const LOGIN_WALL_SEGMENTS: [&str; 4] = ["authwall", "login", "checkpoint", "uas"];

/// Whether the given URL is a login-wall redirect rather than a profile page.
///
/// Only the first path segment is compared, so a profile slug that merely
/// begins with "login" (e.g. `/in/login-smith`) is not misclassified.
pub fn is_login_wall(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };

    let first = parsed
        .path_segments()
        .and_then(|mut segments| segments.next())
        .unwrap_or_default();

    LOGIN_WALL_SEGMENTS.contains(&first)
}

/// Navigate to the profile and extract its picture URL.
///
/// Anonymous sessions first get the sign-in overlay dismissed and the current
/// URL checked against the login-wall segments; authenticated sessions skip
/// both (a logged-in session is never redirected, and the check would
/// misfire on nothing).
pub async fn extract_picture(
    session: &BrowserSession,
    profile_url: &str,
    authenticated: bool,
) -> Result<String, ScrapeError> {
    session.navigate(profile_url).await?;
    pacing::jitter_delay(5, 10).await;

    if !authenticated {
        auth::dismiss_login_overlay(session).await;

        let current = session.current_url().await?;
        if is_login_wall(&current) {
            return Err(ScrapeError::LoginWall(current));
        }
    }

    let element = match session
        .wait_for_element(&PICTURE_SELECTORS, PICTURE_TIMEOUT)
        .await
    {
        Ok(element) => element,
        Err(BrowserError::Timeout(detail)) => return Err(ScrapeError::ElementNotFound(detail)),
        Err(e) => return Err(e.into()),
    };

    let picture_url = element
        .attribute("src")
        .await
        .map_err(|e| BrowserError::CommandFailed(e.to_string()))?
        .filter(|src| !src.is_empty())
        .ok_or_else(|| ScrapeError::ElementNotFound("picture element has no src".into()))?;

    debug!("Session {} extracted picture for {}", session.id(), profile_url);
    info!("Found picture: {}", picture_url);
    Ok(picture_url)
}
