// src/models/mod.rs

//! Domain models for the extractor.
//!
//! Configuration types and the page/statistics records passed between
//! the crawler, the extraction pipeline and the report writer.

mod config;
mod page;

// Re-export all public types
pub use config::{Config, CrawlerConfig, ExtractionConfig, OutputConfig};
pub use page::{CrawlOutcome, FetchedPage, Page, RunStats};
