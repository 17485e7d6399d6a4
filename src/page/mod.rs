//! Page contexts.
//!
//! `PageHost` plays the part of the in-page collector for every tab, and
//! `fetch_page` loads live pages into it for the CLI.

mod fetch;
mod host;

pub use fetch::{fetch_page, script_visible_cookies};
pub use host::PageHost;
