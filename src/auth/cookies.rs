//! Persisted authentication cookies
//!
//! The cookie file is a JSON array of cookie records written by the
//! `capture-cookies` utility after a manual login. It is consumed read-only;
//! LinkedIn expires the session server-side without notice, which surfaces
//! here only as login-wall redirects during extraction.

use std::path::Path;

use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::browser::ScrapeError;

/// One cookie record from the persisted auth state.
///
/// Field names follow the CDP `Network.Cookie` serialization, so the output
/// of `capture-cookies` round-trips without translation. Unknown fields
/// (size, priority, ...) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub expires: Option<f64>,
    #[serde(default)]
    pub secure: Option<bool>,
    #[serde(default)]
    pub http_only: Option<bool>,
}

impl StoredCookie {
    /// Build the CDP cookie parameter for injection.
    ///
    /// Returns `None` for records missing a name or domain — those cannot be
    /// scoped to the site and would be rejected by Chrome anyway.
    pub fn to_param(&self) -> Option<CookieParam> {
        if self.name.is_empty() || self.domain.is_empty() {
            return None;
        }

        let mut builder = CookieParam::builder()
            .name(&self.name)
            .value(&self.value)
            .domain(&self.domain);

        if let Some(ref path) = self.path {
            builder = builder.path(path);
        }
        if let Some(secure) = self.secure {
            builder = builder.secure(secure);
        }
        if let Some(http_only) = self.http_only {
            builder = builder.http_only(http_only);
        }

        builder.build().ok()
    }
}

/// Load the persisted cookie file.
///
/// A missing file is a configuration error (`MissingCookies`), fatal to the
/// attempt — no amount of retrying will make the file appear.
pub fn load_cookie_file(path: &Path) -> Result<Vec<StoredCookie>, ScrapeError> {
    if !path.exists() {
        return Err(ScrapeError::MissingCookies(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| ScrapeError::CookieFile(format!("{}: {}", path.display(), e)))?;

    let cookies: Vec<StoredCookie> = serde_json::from_str(&content)
        .map_err(|e| ScrapeError::CookieFile(format!("{}: {}", path.display(), e)))?;

    debug!("Loaded {} cookies from {}", cookies.len(), path.display());
    Ok(cookies)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_cookie_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingCookies(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_cdp_shaped_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(
            &path,
            r#"[
                {"name": "li_at", "value": "tok", "domain": ".linkedin.com",
                 "path": "/", "expires": 1893456000.0, "size": 8,
                 "httpOnly": true, "secure": true, "session": false}
            ]"#,
        )
        .unwrap();

        let cookies = load_cookie_file(&path).unwrap();
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "li_at");
        assert_eq!(cookies[0].http_only, Some(true));
        assert!(cookies[0].to_param().is_some());
    }

    #[test]
    fn test_corrupt_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cookies.json");
        std::fs::write(&path, "not json").unwrap();

        let err = load_cookie_file(&path).unwrap_err();
        assert!(matches!(err, ScrapeError::CookieFile(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_unscoped_record_yields_no_param() {
        let cookie = StoredCookie {
            name: String::new(),
            value: "v".into(),
            domain: ".linkedin.com".into(),
            path: None,
            expires: None,
            secure: None,
            http_only: None,
        };
        assert!(cookie.to_param().is_none());
    }
}
