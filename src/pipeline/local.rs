// src/pipeline/local.rs

//! Offline extraction from files on disk.

use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::Result;
use crate::extract::Extractor;
use crate::models::{Config, CrawlOutcome, RunStats};
use crate::services::html_text;
use crate::storage::{ReportStorage, SYMBOL_TABLE};

use super::log_summary;

/// Run the extraction pipeline over local files instead of a crawl.
///
/// `.html`/`.htm` files contribute their body text, anything else is read as
/// plain text. Unreadable files are counted as failures and skipped.
pub async fn run_local(
    config: &Config,
    files: &[PathBuf],
    storage: &dyn ReportStorage,
) -> Result<RunStats> {
    let start_time = Utc::now();
    let extractor = Extractor::new(config.extraction.stop_words.clone());
    let mut outcome = CrawlOutcome::default();

    log::info!("Extracting from {} local files", files.len());

    for path in files {
        match read_text(path).await {
            Ok(text) => {
                extractor.process(&text);
                outcome.pages_visited += 1;
                log::debug!("Processed {}", path.display());
            }
            Err(error) => {
                outcome.page_failures += 1;
                log::warn!("Failed to read {}: {}", path.display(), error);
            }
        }
    }

    let characters = extractor.inventory().export();
    storage.write_report(&characters, SYMBOL_TABLE).await?;

    let stats = RunStats {
        start_time,
        end_time: Utc::now(),
        outcome,
        unique_chars: characters.len(),
        output_path: config.output.path.clone(),
    };
    log_summary(&stats);

    Ok(stats)
}

async fn read_text(path: &Path) -> Result<String> {
    let content = tokio::fs::read_to_string(path).await?;
    if is_html(path) {
        html_text(&content)
    } else {
        Ok(content)
    }
}

fn is_html(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
}
