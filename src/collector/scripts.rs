//! Script and image inventory shared by the tracker and fingerprint collectors.

use scraper::{Html, Selector};
use std::sync::LazyLock;

use crate::utils::parse_selector_with_fallback;

static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("script", "scripts"));
static IMG_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("img", "scripts"));
static CANVAS_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_with_fallback("canvas", "scripts"));

/// An `<img>` element with its declared source and size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageElement {
    pub src: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ImageElement {
    /// A tracking-pixel candidate declares both dimensions as 1px or smaller.
    pub fn is_pixel(&self) -> bool {
        matches!((self.width, self.height), (Some(w), Some(h)) if w <= 1 && h <= 1)
    }
}

/// Everything the script-based collectors look at, extracted in one parse.
#[derive(Debug, Clone, Default)]
pub struct ScriptInventory {
    /// `src` attributes of external scripts
    pub sources: Vec<String>,
    /// Text of inline scripts
    pub inline: Vec<String>,
    pub images: Vec<ImageElement>,
    pub canvas_count: usize,
}

impl ScriptInventory {
    pub fn from_document(document: &Html) -> Self {
        let mut sources = Vec::new();
        let mut inline = Vec::new();

        for script in document.select(&SCRIPT_SELECTOR) {
            match script.value().attr("src") {
                Some(src) if !src.trim().is_empty() => sources.push(src.trim().to_string()),
                _ => {
                    let text: String = script.text().collect();
                    if !text.trim().is_empty() {
                        inline.push(text);
                    }
                }
            }
        }

        let images = document
            .select(&IMG_SELECTOR)
            .map(|img| ImageElement {
                src: img.value().attr("src").map(|s| s.to_string()),
                width: img.value().attr("width").and_then(parse_dimension),
                height: img.value().attr("height").and_then(parse_dimension),
            })
            .collect();

        let canvas_count = document.select(&CANVAS_SELECTOR).count();

        ScriptInventory {
            sources,
            inline,
            images,
            canvas_count,
        }
    }

    /// All inline script text joined, for substring heuristics.
    pub fn inline_text(&self) -> String {
        self.inline.join("\n")
    }
}

/// Parses an HTML dimension attribute (`1`, `1px`, `0`).
fn parse_dimension(value: &str) -> Option<u32> {
    value
        .trim()
        .trim_end_matches("px")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .map(|v| v.ceil() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inventory_splits_external_and_inline() {
        let html = r#"<html><head>
            <script src="https://cdn.example.com/app.js"></script>
            <script>var x = 1;</script>
            <script src="  "></script>
        </head><body><canvas></canvas></body></html>"#;
        let inventory = ScriptInventory::from_document(&Html::parse_document(html));
        assert_eq!(inventory.sources, vec!["https://cdn.example.com/app.js"]);
        assert_eq!(inventory.inline.len(), 1);
        assert_eq!(inventory.canvas_count, 1);
    }

    #[test]
    fn test_pixel_detection() {
        let html = r#"<img src="a.gif" width="1" height="1">
            <img src="b.gif" width="1px" height="0">
            <img src="c.png" width="300" height="1">
            <img src="d.png">"#;
        let inventory = ScriptInventory::from_document(&Html::parse_document(html));
        let pixels: Vec<_> = inventory.images.iter().filter(|i| i.is_pixel()).collect();
        assert_eq!(pixels.len(), 2);
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(parse_dimension("1"), Some(1));
        assert_eq!(parse_dimension(" 1px "), Some(1));
        assert_eq!(parse_dimension("0.5"), Some(1));
        assert_eq!(parse_dimension("auto"), None);
        assert_eq!(parse_dimension("-1"), None);
    }
}
