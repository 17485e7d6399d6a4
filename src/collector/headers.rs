//! Security header surrogates visible from the page context.
//!
//! Real response headers are out of reach here. The only visible surrogates
//! are `<meta http-equiv="Content-Security-Policy">` and
//! `<meta name="referrer">`.

use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::config::{HEADERS_UNAVAILABLE_ISSUE, REQUIRED_SECURITY_HEADERS};
use crate::models::HeaderSignals;
use crate::utils::parse_selector_with_fallback;

static META_HTTP_EQUIV_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("meta[http-equiv]", "headers"));
static META_REFERRER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("meta[name]", "headers"));

const CSP: &str = "content-security-policy";
const REFERRER_POLICY: &str = "referrer-policy";

pub fn collect_headers(document: &Html) -> HeaderSignals {
    let mut present = Vec::new();
    let mut issues = Vec::new();

    let csp = document
        .select(&META_HTTP_EQUIV_SELECTOR)
        .find(|meta| {
            meta.value()
                .attr("http-equiv")
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(CSP))
        })
        .map(|meta| meta.value().attr("content").unwrap_or_default().to_string());

    if let Some(policy) = csp {
        present.push(CSP.to_string());
        let policy = policy.to_ascii_lowercase();
        if policy.contains("'unsafe-inline'") {
            issues.push("Content-Security-Policy allows 'unsafe-inline'".to_string());
        }
        if policy.contains("'unsafe-eval'") {
            issues.push("Content-Security-Policy allows 'unsafe-eval'".to_string());
        }
    }

    let has_referrer_policy = document.select(&META_REFERRER_SELECTOR).any(|meta| {
        meta.value()
            .attr("name")
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("referrer"))
    });
    if has_referrer_policy {
        present.push(REFERRER_POLICY.to_string());
    }

    if present.is_empty() {
        issues.push(HEADERS_UNAVAILABLE_ISSUE.to_string());
    }

    let missing = REQUIRED_SECURITY_HEADERS
        .iter()
        .filter(|required| !present.iter().any(|p| p == *required))
        .map(|required| required.to_string())
        .collect();

    HeaderSignals {
        present,
        missing,
        issues,
    }
}
