//! Session authentication
//!
//! Cookie-file handling and the bootstrap that turns a persisted cookie jar
//! into a logged-in browser session.

mod bootstrap;
mod cookies;

pub use bootstrap::{dismiss_login_overlay, open_session, SITE_ROOT};
pub use cookies::{load_cookie_file, StoredCookie};
