//! Raw per-visit observations gathered inside the page context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Cookie observations.
///
/// Only script-readable cookies are visible from inside the page, so every
/// observed cookie is first-party. `third_party` is an estimate, and
/// `secure`/`http_only` stay at zero unless a privileged observer filled them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CookieSignals {
    /// First-party plus estimated third-party cookies
    pub total: u32,
    /// Cookies read from the document cookie string
    pub first_party: u32,
    /// Estimated third-party cookies (fixed ratio of first-party)
    pub third_party: u32,
    /// First-party cookies known to carry the `Secure` attribute
    pub secure: u32,
    /// First-party cookies known to carry the `HttpOnly` attribute
    pub http_only: u32,
    /// Cookie names, in document order
    #[serde(default)]
    pub names: Vec<String>,
}

impl CookieSignals {
    /// Share of all cookies estimated to be third-party, in `[0, 1]`.
    pub fn third_party_ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        (self.third_party as f64 / self.total as f64).clamp(0.0, 1.0)
    }

    /// Share of first-party cookie flags that are hardened, in `[0, 1]`.
    ///
    /// Each first-party cookie can contribute two flags (`Secure` and
    /// `HttpOnly`); the ratio is hardened flags over possible flags.
    pub fn hardened_ratio(&self) -> f64 {
        if self.first_party == 0 {
            return 0.0;
        }
        let flags = self.secure as f64 + self.http_only as f64;
        (flags / (2.0 * self.first_party as f64)).clamp(0.0, 1.0)
    }
}

/// Known trackers detected in the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackerSignals {
    /// Deduplicated, sorted tracker names
    pub detected: Vec<String>,
    /// Number of 1x1 (or smaller) images seen
    #[serde(default)]
    pub pixel_count: u32,
}

impl TrackerSignals {
    pub fn count(&self) -> usize {
        self.detected.len()
    }
}

/// Browser fingerprinting technique recognised by the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FingerprintTechnique {
    Canvas,
    Webgl,
    Audio,
    Fonts,
}

impl FingerprintTechnique {
    pub fn as_str(&self) -> &'static str {
        match self {
            FingerprintTechnique::Canvas => "canvas",
            FingerprintTechnique::Webgl => "webgl",
            FingerprintTechnique::Audio => "audio",
            FingerprintTechnique::Fonts => "fonts",
        }
    }
}

/// Fingerprinting risk tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FingerprintRisk {
    #[default]
    Low,
    Medium,
    High,
}

impl FingerprintRisk {
    /// Low for none, medium for one or two, high for three or more.
    pub fn from_technique_count(count: usize) -> Self {
        match count {
            0 => FingerprintRisk::Low,
            1 | 2 => FingerprintRisk::Medium,
            _ => FingerprintRisk::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FingerprintRisk::Low => "low",
            FingerprintRisk::Medium => "medium",
            FingerprintRisk::High => "high",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FingerprintSignals {
    pub techniques: Vec<FingerprintTechnique>,
    pub risk: FingerprintRisk,
}

impl FingerprintSignals {
    /// Builds the signals from detected techniques, deriving the risk tier.
    pub fn from_techniques(mut techniques: Vec<FingerprintTechnique>) -> Self {
        techniques.sort();
        techniques.dedup();
        let risk = FingerprintRisk::from_technique_count(techniques.len());
        Self { techniques, risk }
    }
}

/// Security header observations.
///
/// From the page context only `<meta>` surrogates are visible; `issues`
/// records that degradation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderSignals {
    pub present: Vec<String>,
    pub missing: Vec<String>,
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SslSignals {
    pub valid: bool,
    /// Certificate issuer, when a privileged observer could read it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

/// Raw observations for one page visit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignalBundle {
    pub url: String,
    pub domain: String,
    pub timestamp: DateTime<Utc>,
    pub cookies: CookieSignals,
    pub trackers: TrackerSignals,
    pub fingerprinting: FingerprintSignals,
    pub headers: HeaderSignals,
    pub ssl: SslSignals,
}

impl SignalBundle {
    /// Creates an empty bundle for `url`; every category holds its
    /// empty or low-risk default.
    pub fn empty(url: &str, domain: &str, timestamp: DateTime<Utc>) -> Self {
        Self {
            url: url.to_string(),
            domain: domain.to_string(),
            timestamp,
            cookies: CookieSignals::default(),
            trackers: TrackerSignals::default(),
            fingerprinting: FingerprintSignals::default(),
            headers: HeaderSignals::default(),
            ssl: SslSignals::default(),
        }
    }
}
