//! Domain extraction and reputation classification.
//!
//! Key functions:
//! - `extract_domain()` - Derives the cache key domain from a page URL
//! - `classify_domain()` - Out-of-band reputation hint used by the scorer

mod reputation;

pub use reputation::{classify_domain, ReputationHint};

use crate::error_handling::AnalysisError;

/// Extracts the domain (lowercased host) of an http(s) page URL.
///
/// The mapping is deterministic: the same URL always yields the same
/// domain, so it can key the result cache. Ports, paths, queries and
/// fragments are ignored; IP hosts are kept as-is.
///
/// # Errors
///
/// Returns `AnalysisError::InvalidUrl` if the URL does not parse, has no
/// host, or does not use the http/https scheme (browser-internal pages
/// such as `chrome://` cannot be analyzed).
pub fn extract_domain(url: &str) -> Result<String, AnalysisError> {
    let parsed = url::Url::parse(url).map_err(|_| AnalysisError::InvalidUrl(url.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        _ => return Err(AnalysisError::InvalidUrl(url.to_string())),
    }

    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| AnalysisError::InvalidUrl(url.to_string()))?;

    // IPv6 hosts come back bracketed; strip brackets for a stable key
    Ok(host
        .trim_start_matches('[')
        .trim_end_matches(']')
        .to_ascii_lowercase())
}
