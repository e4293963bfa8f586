//! Browser automation module
//!
//! Launches and controls one Chrome instance per scrape attempt over the
//! Chrome DevTools Protocol.

mod errors;
mod session;

pub use errors::{BrowserError, ScrapeError};
pub use session::BrowserSession;
