//! Browser and scrape error types

use std::path::PathBuf;
use thiserror::Error;

/// Browser-related errors
#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("CDP command failed: {0}")]
    CommandFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors from a single profile-fetch attempt.
///
/// The retry loop inspects `is_fatal()` to decide between consuming a retry
/// and aborting the profile outright.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Cookie file not found: {0}")]
    MissingCookies(PathBuf),

    #[error("Cookie file unreadable: {0}")]
    CookieFile(String),

    #[error("Redirected to login wall: {0}")]
    LoginWall(String),

    #[error("Profile picture element not found: {0}")]
    ElementNotFound(String),

    #[error(transparent)]
    Browser(#[from] BrowserError),
}

impl ScrapeError {
    /// Fatal errors are configuration problems that no amount of retrying can
    /// clear (e.g. a missing cookie file). Everything else, including a
    /// login-wall redirect, consumes a retry attempt.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::MissingCookies(_) | Self::CookieFile(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(ScrapeError::MissingCookies(PathBuf::from("cookies.json")).is_fatal());
        assert!(ScrapeError::CookieFile("bad json".into()).is_fatal());
        assert!(!ScrapeError::LoginWall("https://www.linkedin.com/authwall".into()).is_fatal());
        assert!(!ScrapeError::ElementNotFound("img.presence-entity__image".into()).is_fatal());
        assert!(!ScrapeError::Browser(BrowserError::Timeout("navigation".into())).is_fatal());
    }
}
