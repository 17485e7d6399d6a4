//! Signal collection from a page snapshot.
//!
//! Collection is synchronous and never fails: every category degrades to
//! its empty or low-risk default instead of aborting the bundle.

mod cookies;
mod fingerprinting;
mod headers;
mod scripts;
mod tls;
mod trackers;

use chrono::{DateTime, Utc};
use scraper::Html;
use serde::{Deserialize, Serialize};

use crate::domain::extract_domain;
use crate::models::SignalBundle;

pub use cookies::collect_cookies;
pub use fingerprinting::collect_fingerprinting;
pub use headers::collect_headers;
pub use scripts::{ImageElement, ScriptInventory};
pub use tls::collect_tls;
pub use trackers::{collect_trackers, TRACKING_PIXEL};

/// The document as seen from inside the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSnapshot {
    pub url: String,
    pub html: String,
    /// `document.cookie` style string
    pub cookies: String,
}

impl PageSnapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>, cookies: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            cookies: cookies.into(),
        }
    }
}

/// Collects every signal category from `page`.
///
/// The HTML is parsed once and shared by the DOM-based collectors. If the
/// URL has no extractable domain the bundle carries an empty domain; the
/// coordinator substitutes the domain it was asked about.
pub fn collect_signals(page: &PageSnapshot, timestamp: DateTime<Utc>) -> SignalBundle {
    let domain = extract_domain(&page.url).unwrap_or_else(|e| {
        log::debug!("No domain for collected page {}: {}", page.url, e);
        String::new()
    });

    let document = Html::parse_document(&page.html);
    let inventory = ScriptInventory::from_document(&document);

    let bundle = SignalBundle {
        url: page.url.clone(),
        domain,
        timestamp,
        cookies: collect_cookies(&page.cookies),
        trackers: collect_trackers(&inventory),
        fingerprinting: collect_fingerprinting(&inventory),
        headers: collect_headers(&document),
        ssl: collect_tls(&page.url),
    };

    log::debug!(
        "Collected signals for {}: {} cookies, {} trackers, {} fingerprinting techniques",
        bundle.url,
        bundle.cookies.total,
        bundle.trackers.count(),
        bundle.fingerprinting.techniques.len()
    );

    bundle
}

/// Minimal bundle used when the page context never answered: only the TLS
/// status derived from the URL is filled in.
pub fn fallback_bundle(url: &str, domain: &str, timestamp: DateTime<Utc>) -> SignalBundle {
    SignalBundle {
        ssl: collect_tls(url),
        ..SignalBundle::empty(url, domain, timestamp)
    }
}
