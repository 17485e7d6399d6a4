//! Statistics printing.

use log::info;
use strum::IntoEnumIterator;

use crate::error_handling::{ErrorType, InfoType, PipelineStats};

/// Prints error and info counters to the log.
///
/// Only non-zero counters are listed; nothing is printed for a quiet run.
pub fn print_pipeline_statistics(stats: &PipelineStats) {
    let total_errors = stats.total_errors();
    let total_info = stats.total_info();

    if total_errors > 0 {
        info!("Error Counts ({} total):", total_errors);
        for error_type in ErrorType::iter() {
            let count = stats.get_error_count(error_type);
            if count > 0 {
                info!("   {}: {}", error_type.as_str(), count);
            }
        }
    }

    if total_info > 0 {
        info!("Info Counts ({} total):", total_info);
        for info_type in InfoType::iter() {
            let count = stats.get_info_count(info_type);
            if count > 0 {
                info!("   {}: {}", info_type.as_str(), count);
            }
        }
    }
}

/// One-line summary of an analysis run.
pub fn print_run_summary(analyzed: usize, from_cache: usize, failed: usize, elapsed_seconds: f64) {
    let total = analyzed + failed;
    info!(
        "Analyzed {} page{} ({} from cache, {} failed) in {:.1}s",
        total,
        if total == 1 { "" } else { "s" },
        from_cache,
        failed,
        elapsed_seconds
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printing_empty_and_populated_stats() {
        let stats = PipelineStats::new();
        print_pipeline_statistics(&stats);
        stats.increment_error(ErrorType::CollectionTimeout);
        stats.increment_info(InfoType::CacheHit);
        print_pipeline_statistics(&stats);
        assert_eq!(stats.total_errors(), 1);
        assert_eq!(stats.total_info(), 1);
    }
}
