//! Proxy pool
//!
//! Fetches a small pool of candidate HTTP proxies from a public listing
//! service at startup and hands out random picks, one per browser launch.
//! Strictly best-effort: every failure degrades to "no proxy".

use rand::seq::SliceRandom;
use tracing::{info, warn};

/// Maximum number of entries kept from the listing service
pub const MAX_POOL_SIZE: usize = 10;

/// Public proxy directory returning newline-delimited `host:port` entries
pub const DEFAULT_LIST_URL: &str =
    "https://api.proxyscrape.com/v2/?request=displayproxies&protocol=http&timeout=5000";

/// A pool of candidate `host:port` proxy entries
#[derive(Debug, Clone, Default)]
pub struct ProxyPool {
    entries: Vec<String>,
}

impl ProxyPool {
    /// An empty pool; picks always return `None`
    pub fn empty() -> Self {
        Self::default()
    }

    /// Fetch the pool from a listing endpoint.
    ///
    /// Never fails — network or HTTP errors are logged and yield an empty
    /// pool, which downstream callers treat as "run without a proxy".
    pub async fn fetch(client: &reqwest::Client, list_url: &str) -> Self {
        let body = match client.get(list_url).send().await {
            Ok(resp) => match resp.error_for_status() {
                Ok(resp) => match resp.text().await {
                    Ok(body) => body,
                    Err(e) => {
                        warn!("Proxy list body unreadable: {}", e);
                        return Self::empty();
                    }
                },
                Err(e) => {
                    warn!("Proxy list request rejected: {}", e);
                    return Self::empty();
                }
            },
            Err(e) => {
                warn!("Proxy list fetch failed: {}", e);
                return Self::empty();
            }
        };

        let entries = parse_proxy_list(&body);
        info!("Proxy pool loaded with {} entries", entries.len());
        Self { entries }
    }

    /// Uniform random pick; `None` when the pool is empty
    pub fn pick_random(&self) -> Option<&str> {
        self.entries
            .choose(&mut rand::thread_rng())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a newline-delimited `host:port` listing, dropping entries that do
/// not form a valid proxy URL, truncated to `MAX_POOL_SIZE`.
fn parse_proxy_list(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| is_valid_proxy_entry(line))
        .take(MAX_POOL_SIZE)
        .map(str::to_string)
        .collect()
}

/// Whether a listing line is a usable `host:port` entry.
///
/// The port is checked on the raw line: `Url::port()` returns `None` for a
/// port that equals the scheme default, which would drop the very common
/// `host:80` entries from public HTTP listings.
fn is_valid_proxy_entry(line: &str) -> bool {
    let Some((host, port)) = line.rsplit_once(':') else {
        return false;
    };

    if port.parse::<u16>().is_err() {
        return false;
    }

    url::Url::parse(&format!("http://{}", host))
        .map(|u| u.host_str().is_some())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_truncates_to_pool_size() {
        let body = (0..50)
            .map(|i| format!("10.0.0.{}:8080", i))
            .collect::<Vec<_>>()
            .join("\n");
        let entries = parse_proxy_list(&body);
        assert_eq!(entries.len(), MAX_POOL_SIZE);
        assert_eq!(entries[0], "10.0.0.0:8080");
    }

    #[test]
    fn test_parse_drops_garbage_lines() {
        let body = "1.2.3.4:3128\n\n   \nnot a proxy at all\n5.6.7.8:80\n";
        let entries = parse_proxy_list(body);
        assert_eq!(entries, vec!["1.2.3.4:3128", "5.6.7.8:80"]);
    }

    #[test]
    fn test_parse_keeps_scheme_default_ports() {
        let entries = parse_proxy_list("5.6.7.8:80\n9.10.11.12:443\n");
        assert_eq!(entries, vec!["5.6.7.8:80", "9.10.11.12:443"]);
    }

    #[test]
    fn test_parse_rejects_missing_or_bad_port() {
        assert!(parse_proxy_list("1.2.3.4\n1.2.3.4:notaport\n1.2.3.4:99999\n").is_empty());
    }

    #[test]
    fn test_pick_from_empty_pool() {
        assert!(ProxyPool::empty().pick_random().is_none());
    }

    #[test]
    fn test_pick_returns_member() {
        let pool = ProxyPool {
            entries: vec!["1.2.3.4:3128".to_string(), "5.6.7.8:80".to_string()],
        };
        for _ in 0..20 {
            let pick = pool.pick_random().unwrap();
            assert!(pool.entries.iter().any(|e| e == pick));
        }
    }
}
