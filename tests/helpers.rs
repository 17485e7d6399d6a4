// Shared test helpers for runtime setup and sample pages.

use std::time::Duration;

use page_trust::initialization::init_store;
use page_trust::storage::DocumentStore;
use page_trust::{Config, PageSnapshot, Runtime};

/// Config with a short collection wait so fallback paths finish quickly.
#[allow(dead_code)] // Not every test file uses every helper
pub fn test_config() -> Config {
    Config {
        collection_timeout: Duration::from_millis(200),
        backend_timeout: Duration::from_secs(5),
        explanation_timeout: Duration::from_secs(5),
        ..Config::default()
    }
}

#[allow(dead_code)]
pub async fn memory_store() -> DocumentStore {
    init_store(None).await.expect("Failed to open in-memory store")
}

#[allow(dead_code)]
pub async fn memory_runtime() -> Runtime {
    Runtime::with_store(&test_config(), memory_store().await)
        .await
        .expect("Failed to start runtime")
}

/// A news-style page with three trackers, a canvas and a meta CSP.
#[allow(dead_code)]
pub fn tracked_page(url: &str) -> PageSnapshot {
    let html = r#"<!doctype html>
        <html><head>
          <meta http-equiv="Content-Security-Policy" content="default-src 'self'">
          <script async src="https://www.googletagmanager.com/gtag/js?id=G-TEST"></script>
          <script>gtag('config', 'G-TEST');</script>
          <script src="https://connect.facebook.net/en_US/fbevents.js"></script>
          <script>fbq('init', '1234');</script>
        </head><body>
          <canvas id="chart"></canvas>
          <p>Headlines</p>
        </body></html>"#;
    PageSnapshot::new(url, html, "_ga=GA1.2.3; theme=dark; _fbp=fb.1.2")
}

/// A page with nothing to observe.
#[allow(dead_code)]
pub fn blank_page(url: &str) -> PageSnapshot {
    PageSnapshot::new(url, "<html><body><p>hello</p></body></html>", "")
}
