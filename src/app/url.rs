//! URL validation and normalization utilities.

use log::warn;

use crate::config::MAX_URL_LENGTH;

/// Validates a URL given on the command line and normalizes it for analysis.
///
/// Bare hosts get an `https://` prefix. Anything that does not parse, has no
/// host, uses a scheme other than http/https, or exceeds `MAX_URL_LENGTH`
/// (before or after normalization) is logged and rejected with `None`.
pub fn validate_and_normalize_url(url: &str) -> Option<String> {
    let normalized = if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    };

    if normalized.len() > MAX_URL_LENGTH {
        warn!(
            "Skipping URL longer than {} bytes: {}...",
            MAX_URL_LENGTH,
            preview(url)
        );
        return None;
    }

    let parsed = match url::Url::parse(&normalized) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Skipping invalid URL {url}: {e}");
            return None;
        }
    };
    if parsed.host_str().is_none_or(str::is_empty) {
        warn!("Skipping URL without a host: {url}");
        return None;
    }
    match parsed.scheme() {
        "http" | "https" => Some(normalized),
        scheme => {
            warn!("Skipping {scheme} URL: {url}");
            None
        }
    }
}

/// The first 50 characters, for log lines.
fn preview(url: &str) -> &str {
    match url.char_indices().nth(50) {
        Some((cut, _)) => &url[..cut],
        None => url,
    }
}
