//! CSS selector parsing for the page collectors.

use scraper::Selector;

/// Selector that never matches; used when a collector selector fails to parse.
const MATCH_NOTHING: &str = "*:not(*)";

/// Parses a collector selector, degrading to a match-nothing selector.
///
/// A collector whose selector cannot be parsed reports an empty category
/// rather than aborting the whole bundle.
///
/// # Arguments
///
/// * `selector_str` - The CSS selector string to parse
/// * `collector` - Collector name for error logging (e.g., "trackers")
pub fn parse_selector_with_fallback(selector_str: &str, collector: &str) -> Selector {
    Selector::parse(selector_str).unwrap_or_else(|e| {
        log::error!(
            "Failed to parse CSS selector '{}' for {} collector: {}. Using fallback selector.",
            selector_str,
            collector,
            e
        );
        Selector::parse(MATCH_NOTHING)
            .expect("Fallback selector '*:not(*)' should always parse - this is a programming error")
    })
}
