//! Domain reputation hints.
//!
//! A domain is `Trusted` when it matches the allow-list (exactly or as a
//! subdomain), `Suspicious` when its name matches a lexical pattern common
//! to phishing and throwaway hosts, and `Neutral` otherwise. The allow-list
//! wins over the patterns.

use regex::Regex;
use std::sync::LazyLock;

/// Well-known domains treated as trusted.
const TRUSTED_DOMAINS: &[&str] = &[
    "google.com",
    "youtube.com",
    "github.com",
    "microsoft.com",
    "apple.com",
    "amazon.com",
    "wikipedia.org",
    "mozilla.org",
    "stackoverflow.com",
    "linkedin.com",
    "cloudflare.com",
    "rust-lang.org",
];

/// Lexical patterns that mark a domain as suspicious.
const SUSPICIOUS_PATTERN_STRS: &[&str] = &[
    // Raw IPv4 host
    r"^\d{1,3}(\.\d{1,3}){3}$",
    // Free TLDs heavily used for abuse
    r"\.(tk|ml|ga|cf|gq|xyz|top|zip)$",
    // Credential-bait keywords
    r"(login|signin|verify|secure|account|update|banking|wallet)[-.]",
    r"[-.](login|signin|verify|secure|account|update|banking|wallet)",
    // Brand names used outside their own domains
    r"(paypal|apple|microsoft|amazon|google|netflix)[^.]*-",
    // Long digit runs or many hyphens
    r"\d{5,}",
    r"(-[^-.]+){3,}",
];

static SUSPICIOUS_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    SUSPICIOUS_PATTERN_STRS
        .iter()
        .filter_map(|pattern| match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                log::error!("Failed to compile reputation pattern '{}': {}", pattern, e);
                None
            }
        })
        .collect()
});

/// Out-of-band classification of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReputationHint {
    Trusted,
    Suspicious,
    Neutral,
}

impl ReputationHint {
    /// Multiplier applied to the cookie, tracker, fingerprint and header
    /// sub-scores. TLS is never multiplied.
    pub fn multiplier(&self) -> f64 {
        match self {
            ReputationHint::Trusted => 1.2,
            ReputationHint::Suspicious => 0.6,
            ReputationHint::Neutral => 1.0,
        }
    }
}

fn is_allow_listed(domain: &str) -> bool {
    TRUSTED_DOMAINS.iter().any(|trusted| {
        domain == *trusted
            || domain
                .strip_suffix(trusted)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// Classifies `domain` for scoring.
pub fn classify_domain(domain: &str) -> ReputationHint {
    let domain = domain.trim_end_matches('.').to_ascii_lowercase();

    if is_allow_listed(&domain) {
        return ReputationHint::Trusted;
    }

    if SUSPICIOUS_PATTERNS.iter().any(|re| re.is_match(&domain)) {
        return ReputationHint::Suspicious;
    }

    ReputationHint::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_list_exact_and_subdomain() {
        assert_eq!(classify_domain("github.com"), ReputationHint::Trusted);
        assert_eq!(classify_domain("docs.github.com"), ReputationHint::Trusted);
        assert_eq!(classify_domain("WWW.Google.com."), ReputationHint::Trusted);
    }

    #[test]
    fn test_lookalike_is_not_trusted() {
        // Suffix match must sit on a label boundary
        assert_ne!(classify_domain("evilgithub.com"), ReputationHint::Trusted);
        assert_eq!(
            classify_domain("paypal-login-verify.tk"),
            ReputationHint::Suspicious
        );
    }

    #[test]
    fn test_suspicious_patterns() {
        assert_eq!(classify_domain("203.0.113.9"), ReputationHint::Suspicious);
        assert_eq!(classify_domain("free-prizes.xyz"), ReputationHint::Suspicious);
        assert_eq!(classify_domain("secure-bank.example"), ReputationHint::Suspicious);
        assert_eq!(classify_domain("shop123456.com"), ReputationHint::Suspicious);
    }

    #[test]
    fn test_neutral() {
        assert_eq!(classify_domain("example.com"), ReputationHint::Neutral);
        assert_eq!(classify_domain("blog.example.org"), ReputationHint::Neutral);
    }

    #[test]
    fn test_multipliers() {
        assert_eq!(ReputationHint::Trusted.multiplier(), 1.2);
        assert_eq!(ReputationHint::Suspicious.multiplier(), 0.6);
        assert_eq!(ReputationHint::Neutral.multiplier(), 1.0);
    }
}
