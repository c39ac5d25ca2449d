// src/models/page.rs

//! Crawled page and run statistics structures.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use url::Url;

/// Body text and outgoing links of a fetched document.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL the content was served from, after redirects
    pub url: Url,

    /// Text content of `<body>`
    pub text: String,

    /// Absolute links found on the page
    pub links: Vec<Url>,
}

/// A page delivered by the crawler.
#[derive(Debug, Clone)]
pub struct Page {
    pub url: Url,
    /// Link depth, the seed is 1
    pub depth: usize,
    pub text: String,
    /// Absolute links found on the page
    pub links: Vec<Url>,
}

/// Summary of a crawl run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    /// Pages fetched successfully
    pub pages_visited: usize,
    /// Pages whose fetch failed
    pub page_failures: usize,
    /// Links dropped by domain or exclude rules
    pub links_skipped: usize,
    /// Fetches that redirected to an already seen URL
    pub redirect_duplicates: usize,
}

/// Statistics for one extraction run.
#[derive(Debug, Clone)]
pub struct RunStats {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub outcome: CrawlOutcome,
    pub unique_chars: usize,
    pub output_path: PathBuf,
}

impl RunStats {
    /// Elapsed wall time in milliseconds.
    pub fn elapsed_ms(&self) -> i64 {
        (self.end_time - self.start_time).num_milliseconds()
    }
}
