//! Fingerprinting technique heuristics.

use super::scripts::ScriptInventory;
use crate::models::{FingerprintSignals, FingerprintTechnique};

// Substrings in inline script text that indicate each technique.
const CANVAS_MARKERS: &[&str] = &["toDataURL", "getImageData"];
const WEBGL_MARKERS: &[&str] = &[
    "WEBGL_debug_renderer_info",
    "UNMASKED_RENDERER_WEBGL",
    "UNMASKED_VENDOR_WEBGL",
];
const AUDIO_MARKERS: &[&str] = &["createOscillator", "OfflineAudioContext", "createDynamicsCompressor"];
const FONT_MARKERS: &[&str] = &["measureText", "document.fonts.check"];

fn contains_any(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| text.contains(marker))
}

/// Detects fingerprinting techniques from canvas elements and script text.
///
/// A `<canvas>` element on its own counts as canvas fingerprinting; the
/// other techniques are only inferred from script usage patterns.
pub fn collect_fingerprinting(inventory: &ScriptInventory) -> FingerprintSignals {
    let text = inventory.inline_text();
    let mut techniques = Vec::new();

    if inventory.canvas_count > 0 || contains_any(&text, CANVAS_MARKERS) {
        techniques.push(FingerprintTechnique::Canvas);
    }
    if contains_any(&text, WEBGL_MARKERS) {
        techniques.push(FingerprintTechnique::Webgl);
    }
    if contains_any(&text, AUDIO_MARKERS) {
        techniques.push(FingerprintTechnique::Audio);
    }
    if contains_any(&text, FONT_MARKERS) {
        techniques.push(FingerprintTechnique::Fonts);
    }

    FingerprintSignals::from_techniques(techniques)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FingerprintRisk;
    use scraper::Html;

    fn fingerprint(html: &str) -> FingerprintSignals {
        collect_fingerprinting(&ScriptInventory::from_document(&Html::parse_document(html)))
    }

    #[test]
    fn test_no_techniques_is_low_risk() {
        let signals = fingerprint("<p>hello</p><script>console.log(1)</script>");
        assert!(signals.techniques.is_empty());
        assert_eq!(signals.risk, FingerprintRisk::Low);
    }

    #[test]
    fn test_canvas_element_alone() {
        let signals = fingerprint("<canvas id=\"chart\"></canvas>");
        assert_eq!(signals.techniques, vec![FingerprintTechnique::Canvas]);
        assert_eq!(signals.risk, FingerprintRisk::Medium);
    }

    #[test]
    fn test_all_techniques_is_high_risk() {
        let html = r#"<script>
            var c = document.createElement('canvas'); c.toDataURL();
            var gl = c.getContext('webgl'); gl.getExtension('WEBGL_debug_renderer_info');
            var ctx = new OfflineAudioContext(1, 44100, 44100); ctx.createOscillator();
            c.getContext('2d').measureText('mmmmmmmmmmlli');
        </script>"#;
        let signals = fingerprint(html);
        assert_eq!(
            signals.techniques,
            vec![
                FingerprintTechnique::Canvas,
                FingerprintTechnique::Webgl,
                FingerprintTechnique::Audio,
                FingerprintTechnique::Fonts,
            ]
        );
        assert_eq!(signals.risk, FingerprintRisk::High);
    }

    #[test]
    fn test_external_script_urls_are_not_inspected() {
        let signals = fingerprint(r#"<script src="/measureText.js"></script>"#);
        assert!(signals.techniques.is_empty());
    }
}
