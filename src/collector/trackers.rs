//! Tracker detection against a fixed catalog.
//!
//! Each catalog entry maps a tracker name to patterns matched against
//! external script URLs, inline script text and tracking-pixel sources.
//! Matching is a set union, so the order of scripts does not matter.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::scripts::ScriptInventory;
use crate::models::TrackerSignals;

/// Name reported for 1x1 images that match no catalog entry.
pub const TRACKING_PIXEL: &str = "Tracking Pixel";

const TRACKER_CATALOG: &[(&str, &[&str])] = &[
    (
        "Google Analytics",
        &[
            r"google-analytics\.com",
            r#"\bga\s*\(\s*['"]create['"]"#,
            r#"\bgtag\s*\(\s*['"]config['"]\s*,\s*['"](G|UA)-"#,
        ],
    ),
    ("Google Tag Manager", &[r"googletagmanager\.com", r"\bGTM-[A-Z0-9]{4,}"]),
    (
        "Google Ads",
        &[r"doubleclick\.net", r"googleadservices\.com", r"googlesyndication\.com"],
    ),
    (
        "Facebook Pixel",
        &[r"connect\.facebook\.net", r"facebook\.com/tr", r#"\bfbq\s*\(\s*['"]init['"]"#],
    ),
    ("Hotjar", &[r"static\.hotjar\.com", r"\bhjid\b", r"_hjSettings"]),
    ("Mixpanel", &[r"cdn\.mxpnl\.com", r"mixpanel\.com", r"\bmixpanel\.init\s*\("]),
    ("Segment", &[r"cdn\.segment\.com", r"\banalytics\.load\s*\("]),
    ("Amplitude", &[r"cdn\.amplitude\.com", r"\bamplitude\.getInstance\s*\("]),
    ("Heap", &[r"heapanalytics\.com", r"\bheap\.load\s*\("]),
    ("Microsoft Clarity", &[r"clarity\.ms"]),
    ("Bing Ads", &[r"bat\.bing\.com", r"\buetq\b"]),
    ("LinkedIn Insight", &[r"snap\.licdn\.com", r"_linkedin_partner_id"]),
    ("Twitter Pixel", &[r"static\.ads-twitter\.com", r"\btwq\s*\("]),
    ("TikTok Pixel", &[r"analytics\.tiktok\.com", r"\bttq\.load\s*\("]),
    ("Yandex Metrica", &[r"mc\.yandex\.ru", r#"\bym\s*\(\s*\d+\s*,\s*['"]init['"]"#]),
    ("Criteo", &[r"static\.criteo\.net", r"criteo\.com"]),
    ("Taboola", &[r"cdn\.taboola\.com"]),
    ("Outbrain", &[r"widgets\.outbrain\.com"]),
];

struct CatalogEntry {
    name: &'static str,
    pattern: Regex,
}

/// One case-insensitive alternation per tracker; entries that fail to
/// compile are dropped with an error log rather than aborting collection.
static CATALOG: LazyLock<Vec<CatalogEntry>> = LazyLock::new(|| {
    TRACKER_CATALOG
        .iter()
        .filter_map(|(name, patterns)| {
            let joined = format!("(?i)(?:{})", patterns.join("|"));
            match Regex::new(&joined) {
                Ok(pattern) => Some(CatalogEntry {
                    name: *name,
                    pattern,
                }),
                Err(e) => {
                    log::error!("Failed to compile tracker pattern for {}: {}", name, e);
                    None
                }
            }
        })
        .collect()
});

fn matching_trackers<'a>(text: &'a str) -> impl Iterator<Item = &'static str> + 'a {
    CATALOG
        .iter()
        .filter(move |entry| entry.pattern.is_match(text))
        .map(|entry| entry.name)
}

/// Detects known trackers in the page's scripts and tracking pixels.
///
/// Returns a deduplicated, sorted list of tracker names. A pixel whose
/// source matches a catalog entry is reported under that entry; any other
/// pixel is reported once as `Tracking Pixel`.
pub fn collect_trackers(inventory: &ScriptInventory) -> TrackerSignals {
    let mut detected = BTreeSet::new();

    for src in &inventory.sources {
        detected.extend(matching_trackers(src));
    }
    for text in &inventory.inline {
        detected.extend(matching_trackers(text));
    }

    let mut pixel_count = 0u32;
    for image in inventory.images.iter().filter(|i| i.is_pixel()) {
        pixel_count += 1;
        let known: Vec<&str> = image
            .src
            .as_deref()
            .map(|src| matching_trackers(src).collect())
            .unwrap_or_default();
        if known.is_empty() {
            detected.insert(TRACKING_PIXEL);
        } else {
            detected.extend(known);
        }
    }

    TrackerSignals {
        detected: detected.into_iter().map(str::to_string).collect(),
        pixel_count,
    }
}
