//! Demo data synthesis.
//!
//! Fills categories the page context could not observe with plausible
//! random values so demos show varied results. It runs before scoring on a
//! copy of the bundle; the scorer itself never sees a random source.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::THIRD_PARTY_COOKIE_ESTIMATE_RATIO;
use crate::models::{FingerprintSignals, FingerprintTechnique, SignalBundle};

const DEMO_TRACKERS: &[&str] = &[
    "Google Analytics",
    "Facebook Pixel",
    "Hotjar",
    "Mixpanel",
    "Criteo",
    "Taboola",
];

const DEMO_TECHNIQUES: [FingerprintTechnique; 4] = [
    FingerprintTechnique::Canvas,
    FingerprintTechnique::Webgl,
    FingerprintTechnique::Audio,
    FingerprintTechnique::Fonts,
];

pub struct DemoBackfill {
    rng: Mutex<StdRng>,
}

impl DemoBackfill {
    /// Reproducible backfill: the same seed yields the same sequence.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    /// Fills empty cookie, tracker and fingerprint categories in place.
    /// Categories with real observations are left untouched.
    pub fn fill(&self, bundle: &mut SignalBundle) {
        let mut rng = self.rng.lock().unwrap_or_else(|e| e.into_inner());

        if bundle.cookies.total == 0 {
            let first_party = rng.random_range(0..=12u32);
            let third_party = (first_party as f64 * THIRD_PARTY_COOKIE_ESTIMATE_RATIO).floor() as u32;
            bundle.cookies.first_party = first_party;
            bundle.cookies.third_party = third_party;
            bundle.cookies.total = first_party + third_party;
            bundle.cookies.secure = rng.random_range(0..=first_party);
            bundle.cookies.http_only = rng.random_range(0..=first_party);
        }

        if bundle.trackers.detected.is_empty() {
            let mut detected: Vec<String> = DEMO_TRACKERS
                .iter()
                .filter(|_| rng.random_bool(0.3))
                .map(|name| name.to_string())
                .collect();
            detected.sort();
            bundle.trackers.detected = detected;
        }

        if bundle.fingerprinting.techniques.is_empty() {
            let techniques = DEMO_TECHNIQUES
                .iter()
                .copied()
                .filter(|_| rng.random_bool(0.2))
                .collect();
            bundle.fingerprinting = FingerprintSignals::from_techniques(techniques);
        }
    }
}
