//! Per-URL task processing.

use crate::error_handling::AnalysisError;
use crate::models::AnalysisResult;
use crate::page::fetch_page;

use super::Runtime;

/// What happened to one requested URL.
#[derive(Debug, Clone)]
pub enum PageOutcome {
    Analyzed {
        url: String,
        result: AnalysisResult,
        from_cache: bool,
    },
    /// The page could not be loaded or analyzed.
    Failed {
        url: String,
        error: String,
        retriable: bool,
    },
}

impl PageOutcome {
    pub fn url(&self) -> &str {
        match self {
            PageOutcome::Analyzed { url, .. } | PageOutcome::Failed { url, .. } => url,
        }
    }
}

/// Loads `url`, opens it in a fresh tab and analyzes it.
pub(super) async fn process_url_task(runtime: &Runtime, url: String) -> PageOutcome {
    let snapshot = match fetch_page(runtime.client(), &url).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            log::warn!("Failed to load {}: {}", url, e);
            return PageOutcome::Failed {
                url,
                error: e.to_string(),
                retriable: false,
            };
        }
    };

    match runtime.analyze_snapshot(snapshot).await {
        Ok((result, from_cache)) => PageOutcome::Analyzed {
            url,
            result,
            from_cache,
        },
        Err(e) => failed(url, e),
    }
}

fn failed(url: String, e: AnalysisError) -> PageOutcome {
    log::warn!("Analysis of {} failed: {}", url, e);
    PageOutcome::Failed {
        url,
        retriable: e.is_retriable(),
        error: e.to_string(),
    }
}
