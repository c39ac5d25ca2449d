//! Service layer for the extractor.
//!
//! This module contains the crawl driver:
//! - Page fetching (`PageFetcher`, `HttpFetcher`)
//! - Depth-bounded site crawling (`SiteCrawler`)

mod crawler;
mod fetcher;

pub use crawler::SiteCrawler;
pub use fetcher::{HttpFetcher, PageFetcher, html_text, parse_page};
