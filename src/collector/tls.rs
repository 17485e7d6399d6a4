//! TLS status from the page's declared scheme.

use url::Url;

use crate::models::SslSignals;

/// Valid when the page was served over `https`. Certificate metadata is not
/// visible from the page, so `issuer` is always `None`.
pub fn collect_tls(url: &str) -> SslSignals {
    let valid = Url::parse(url)
        .map(|parsed| parsed.scheme() == "https")
        .unwrap_or(false);
    SslSignals {
        valid,
        issuer: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_decides_validity() {
        assert!(collect_tls("https://example.com").valid);
        assert!(collect_tls("HTTPS://example.com/x").valid);
        assert!(!collect_tls("http://example.com").valid);
        assert!(!collect_tls("garbage").valid);
        assert_eq!(collect_tls("https://example.com").issuer, None);
    }
}
