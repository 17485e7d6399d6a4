//! Configuration constants.
//!
//! This module defines the fixed constants used throughout the pipeline,
//! including timeouts, scoring weights, catalogs and retry parameters.

use std::time::Duration;

// Timeouts
/// Bounded wait for the page context to answer a collection request.
pub const SIGNAL_COLLECTION_TIMEOUT: Duration = Duration::from_secs(10);
/// Bounded wait for a remote-style backend to return an analysis.
pub const BACKEND_ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);
/// Upper bound on explanation generation before it is marked failed.
pub const EXPLANATION_TIMEOUT: Duration = Duration::from_secs(20);
/// Timeout for loading a live page over HTTP.
pub const PAGE_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
/// Artificial round-trip time of the simulated backend.
pub const SIMULATED_BACKEND_LATENCY: Duration = Duration::from_millis(150);

// Cache
/// Default lifetime of a cached analysis, in hours.
pub const DEFAULT_CACHE_EXPIRATION_HOURS: u32 = 24;

// Cookies
/// Estimated third-party cookies per observed first-party cookie.
///
/// Script-readable cookies are first-party by construction, so the
/// third-party count can only be approximated.
pub const THIRD_PARTY_COOKIE_ESTIMATE_RATIO: f64 = 0.3;

// Headers
/// Security headers the header score expects to find.
pub const REQUIRED_SECURITY_HEADERS: [&str; 4] = [
    "content-security-policy",
    "strict-transport-security",
    "x-frame-options",
    "x-content-type-options",
];
/// Recorded when no header surrogate is visible from the page context.
pub const HEADERS_UNAVAILABLE_ISSUE: &str =
    "Response headers are not visible from the page context; only meta tag surrogates were checked";

// TLS
/// Certificate authorities recognised as well-known issuers.
pub const TRUSTED_CERTIFICATE_AUTHORITIES: [&str; 8] = [
    "Let's Encrypt",
    "DigiCert",
    "GlobalSign",
    "Sectigo",
    "GoDaddy",
    "Amazon",
    "Google Trust Services",
    "Cloudflare",
];

// Scoring weights (sum to 1.0)
pub const WEIGHT_SSL: f64 = 0.25;
pub const WEIGHT_HEADERS: f64 = 0.20;
pub const WEIGHT_COOKIES: f64 = 0.20;
pub const WEIGHT_TRACKERS: f64 = 0.20;
pub const WEIGHT_FINGERPRINTING: f64 = 0.15;

// Verdict thresholds
pub const SAFE_THRESHOLD: u8 = 70;
pub const WARNING_THRESHOLD: u8 = 40;

// Reconnect strategy
/// Initial delay in milliseconds before the first reconnect attempt
pub const RECONNECT_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which the reconnect delay is multiplied on each attempt
pub const RECONNECT_FACTOR: u64 = 2;
/// Maximum delay between reconnect attempts in seconds
pub const RECONNECT_MAX_DELAY_SECS: u64 = 15;
/// Maximum number of reconnect attempts after the initial one
pub const RECONNECT_MAX_ATTEMPTS: usize = 4;

// Offline queue
/// Items that failed resubmission this many times are discarded.
pub const MAX_OFFLINE_RETRIES: u32 = 5;

// Channels
/// Capacity of the UI notification broadcast channel.
pub const NOTIFICATION_CHANNEL_CAPACITY: usize = 64;
/// Capacity of the coordinator-to-collector request channel.
pub const COLLECT_CHANNEL_CAPACITY: usize = 32;

// Input limits
/// Maximum URL length accepted from the CLI.
pub const MAX_URL_LENGTH: usize = 2048;
/// Maximum response body size fetched for a live page (2MB)
pub const MAX_RESPONSE_BODY_SIZE: usize = 2 * 1024 * 1024;
/// Fallback User-Agent for live page fetches.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

pub const DEFAULT_DASHBOARD_URL: &str = "https://dashboard.page-trust.dev";
