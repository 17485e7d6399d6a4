//! Heuristic trust scoring.
//!
//! `score` is a pure function of the signal bundle and the domain's
//! reputation hint. Category scores are computed as floats, scaled by the
//! reputation multiplier (TLS excepted), clamped to `[0, 100]` and rounded;
//! the trust score is the weighted sum of the rounded category scores.

use crate::config::{
    REQUIRED_SECURITY_HEADERS, TRUSTED_CERTIFICATE_AUTHORITIES, WEIGHT_COOKIES,
    WEIGHT_FINGERPRINTING, WEIGHT_HEADERS, WEIGHT_SSL, WEIGHT_TRACKERS,
};
use crate::domain::ReputationHint;
use crate::error_handling::AnalysisError;
use crate::models::{
    CookieSignals, FingerprintRisk, FingerprintSignals, HeaderSignals, SignalBundle, SignalScores,
    SslSignals, TrackerSignals, Verdict,
};

const COOKIE_BASE: f64 = 85.0;
const COOKIE_THIRD_PARTY_PENALTY: f64 = 30.0;
const COOKIE_HARDENED_BONUS: f64 = 15.0;

const TRACKER_BASE: f64 = 90.0;
const TRACKER_PENALTY: f64 = 5.0;
const TRACKER_FLOOR: f64 = 40.0;

const FINGERPRINT_BASE: f64 = 95.0;
const FINGERPRINT_TECHNIQUE_PENALTY: f64 = 5.0;

const HEADER_BASE: f64 = 80.0;
const HEADER_PRESENT_BONUS: f64 = 20.0;
const HEADER_MISSING_PENALTY: f64 = 5.0;
const HEADER_ISSUE_PENALTY: f64 = 10.0;

const SSL_VALID: f64 = 100.0;
const SSL_INVALID: f64 = 30.0;

/// Output of the scoring engine for one bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreCard {
    pub scores: SignalScores,
    pub trust_score: u8,
    pub verdict: Verdict,
}

pub fn cookie_score(cookies: &CookieSignals) -> f64 {
    COOKIE_BASE - COOKIE_THIRD_PARTY_PENALTY * cookies.third_party_ratio()
        + COOKIE_HARDENED_BONUS * cookies.hardened_ratio()
}

/// Floored at 40 before the reputation multiplier is applied.
pub fn tracker_score(trackers: &TrackerSignals) -> f64 {
    (TRACKER_BASE - TRACKER_PENALTY * trackers.count() as f64).max(TRACKER_FLOOR)
}

pub fn fingerprint_score(fingerprinting: &FingerprintSignals) -> f64 {
    let tier_penalty = match fingerprinting.risk {
        FingerprintRisk::Low => 0.0,
        FingerprintRisk::Medium => 20.0,
        FingerprintRisk::High => 40.0,
    };
    FINGERPRINT_BASE
        - tier_penalty
        - FINGERPRINT_TECHNIQUE_PENALTY * fingerprinting.techniques.len() as f64
}

pub fn header_score(headers: &HeaderSignals) -> f64 {
    let required_present = REQUIRED_SECURITY_HEADERS
        .iter()
        .filter(|required| headers.present.iter().any(|p| p.eq_ignore_ascii_case(required)))
        .count();
    HEADER_BASE
        + HEADER_PRESENT_BONUS * (required_present as f64 / REQUIRED_SECURITY_HEADERS.len() as f64)
        - HEADER_MISSING_PENALTY * headers.missing.len() as f64
        - HEADER_ISSUE_PENALTY * headers.issues.len() as f64
}

/// Whether the certificate issuer is one of the well-known authorities.
pub fn is_trusted_issuer(issuer: &str) -> bool {
    let issuer = issuer.to_ascii_lowercase();
    TRUSTED_CERTIFICATE_AUTHORITIES
        .iter()
        .any(|ca| issuer.contains(&ca.to_ascii_lowercase()))
}

/// Any valid certificate scores full marks; the issuer is informational.
pub fn ssl_score(ssl: &SslSignals) -> f64 {
    if !ssl.valid {
        return SSL_INVALID;
    }
    if let Some(issuer) = ssl.issuer.as_deref() {
        if !is_trusted_issuer(issuer) {
            log::debug!("Valid certificate from unrecognised issuer '{}'", issuer);
        }
    }
    SSL_VALID
}

fn to_score(value: f64) -> u8 {
    value.clamp(0.0, 100.0).round() as u8
}

/// Aggregate trust score: weighted sum, rounded and clamped to `[0, 100]`.
pub fn trust_score(scores: &SignalScores) -> u8 {
    let weighted = WEIGHT_SSL * scores.ssl as f64
        + WEIGHT_HEADERS * scores.headers as f64
        + WEIGHT_COOKIES * scores.cookies as f64
        + WEIGHT_TRACKERS * scores.trackers as f64
        + WEIGHT_FINGERPRINTING * scores.fingerprinting as f64;
    to_score(weighted)
}

/// Rejects bundles whose counters contradict each other.
fn validate(bundle: &SignalBundle) -> Result<(), AnalysisError> {
    let cookies = &bundle.cookies;
    if cookies.first_party.checked_add(cookies.third_party) != Some(cookies.total) {
        return Err(AnalysisError::Scoring(format!(
            "cookie counts do not add up: {} first-party + {} third-party != {} total",
            cookies.first_party, cookies.third_party, cookies.total
        )));
    }
    if cookies.secure > cookies.first_party || cookies.http_only > cookies.first_party {
        return Err(AnalysisError::Scoring(
            "more hardened cookies than first-party cookies".to_string(),
        ));
    }
    let fingerprinting = &bundle.fingerprinting;
    let expected_risk = FingerprintRisk::from_technique_count(fingerprinting.techniques.len());
    if fingerprinting.risk != expected_risk {
        return Err(AnalysisError::Scoring(format!(
            "fingerprint risk '{}' does not match {} techniques",
            fingerprinting.risk.as_str(),
            fingerprinting.techniques.len()
        )));
    }
    Ok(())
}

/// Scores `bundle` under `hint`.
///
/// Deterministic for fixed inputs. Fails only for internally inconsistent
/// bundles, which the collector never produces.
pub fn score(bundle: &SignalBundle, hint: ReputationHint) -> Result<ScoreCard, AnalysisError> {
    validate(bundle)?;

    let multiplier = hint.multiplier();
    let scores = SignalScores {
        cookies: to_score(cookie_score(&bundle.cookies) * multiplier),
        trackers: to_score(tracker_score(&bundle.trackers) * multiplier),
        fingerprinting: to_score(fingerprint_score(&bundle.fingerprinting) * multiplier),
        headers: to_score(header_score(&bundle.headers) * multiplier),
        ssl: to_score(ssl_score(&bundle.ssl)),
    };
    let trust = trust_score(&scores);
    let verdict = Verdict::from_score(trust);

    log::debug!(
        "Scored {} ({:?}): trust {} -> {}",
        bundle.domain,
        hint,
        trust,
        verdict
    );

    Ok(ScoreCard {
        scores,
        trust_score: trust,
        verdict,
    })
}
