//! Scraping core: picture extraction and the per-profile retry loop

pub mod extract;
mod retry;

pub use extract::{extract_picture, is_login_wall};
pub use retry::{fetch_profile_picture, FetchOutcome};
