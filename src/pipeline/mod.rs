//! Pipeline entry points.
//!
//! - `run_extraction`: Crawl a site and write the character report
//! - `run_local`: Same extraction over files on disk, no network

pub mod crawl;
pub mod local;

pub use crawl::run_extraction;
pub use local::run_local;

use crate::models::RunStats;

/// Log the end-of-run summary.
fn log_summary(stats: &RunStats) {
    let outcome = &stats.outcome;
    log::info!(
        "Pages: {} visited, {} failed, {} links skipped, {} redirect duplicates ({} ms)",
        outcome.pages_visited,
        outcome.page_failures,
        outcome.links_skipped,
        outcome.redirect_duplicates,
        stats.elapsed_ms()
    );
    log::info!(
        "Saved characters used on the site to {} (total: {} characters)",
        stats.output_path.display(),
        stats.unique_chars
    );
}
