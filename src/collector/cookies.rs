//! Cookie collection from the document cookie string.

use crate::config::THIRD_PARTY_COOKIE_ESTIMATE_RATIO;
use crate::models::CookieSignals;

/// Parses a `document.cookie` style string (`a=1; b=2`).
///
/// Script-readable cookies are always first-party, and their `Secure` and
/// `HttpOnly` attributes are invisible (HttpOnly cookies are not readable at
/// all), so those counts stay at zero. The third-party count is an estimate:
/// `floor(first_party * THIRD_PARTY_COOKIE_ESTIMATE_RATIO)`.
///
/// An entry without `=` is a cookie with an empty name, as browsers treat it.
pub fn collect_cookies(cookie_string: &str) -> CookieSignals {
    let names: Vec<String> = cookie_string
        .split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| match entry.split_once('=') {
            Some((name, _)) => name.trim().to_string(),
            None => String::new(),
        })
        .collect();

    let first_party = names.len() as u32;
    let third_party = (first_party as f64 * THIRD_PARTY_COOKIE_ESTIMATE_RATIO).floor() as u32;

    CookieSignals {
        total: first_party + third_party,
        first_party,
        third_party,
        secure: 0,
        http_only: 0,
        names,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cookie_string() {
        let cookies = collect_cookies("");
        assert_eq!(cookies, CookieSignals::default());
        assert_eq!(collect_cookies(" ; ;").total, 0);
    }

    #[test]
    fn test_counts_and_estimate() {
        let cookies = collect_cookies("a=1; b=2; c=3; d=4; e=5; f=6; g=7; h=8; i=9; j=10");
        assert_eq!(cookies.first_party, 10);
        assert_eq!(cookies.third_party, 3);
        assert_eq!(cookies.total, 13);
        assert_eq!(cookies.names[0], "a");
    }

    #[test]
    fn test_small_jars_round_down() {
        let cookies = collect_cookies("_ga=GA1.2.3; session=abc");
        assert_eq!(cookies.first_party, 2);
        assert_eq!(cookies.third_party, 0);
        assert_eq!(cookies.names, vec!["_ga", "session"]);
    }

    #[test]
    fn test_values_with_equals_and_nameless_entries() {
        let cookies = collect_cookies("token=a=b=c; justvalue");
        assert_eq!(cookies.names, vec!["token".to_string(), String::new()]);
        assert_eq!(cookies.secure, 0);
        assert_eq!(cookies.http_only, 0);
    }
}
