// src/pipeline/crawl.rs

//! Crawl-and-extract pipeline.

use chrono::Utc;
use url::Url;

use crate::error::{AppError, Result};
use crate::extract::Extractor;
use crate::models::{Config, RunStats};
use crate::services::{PageFetcher, SiteCrawler};
use crate::storage::{ReportStorage, SYMBOL_TABLE};

use super::log_summary;

/// Crawl the configured site and write the character report.
///
/// Configuration is validated before any request is made. Pages that fail
/// to fetch contribute nothing; a report write failure is returned as is.
pub async fn run_extraction<F: PageFetcher>(
    config: &Config,
    fetcher: F,
    storage: &dyn ReportStorage,
) -> Result<RunStats> {
    config.validate()?;

    let start_time = Utc::now();
    let seed = Url::parse(config.crawler.seed_url.trim())
        .map_err(|e| AppError::config(format!("crawler.seed_url is invalid: {e}")))?;

    log::info!(
        "Crawling {} (depth {}, domains: {})",
        seed,
        config.crawler.max_depth,
        config.crawler.allowed_domains.join(", ")
    );

    let extractor = Extractor::new(config.extraction.stop_words.clone());
    let crawler = SiteCrawler::new(fetcher, &config.crawler)?;

    let outcome = crawler
        .crawl(&seed, |page| {
            let filtered = extractor.process(&page.text);
            log::debug!(
                "Processed {} (depth {}): {} script characters",
                page.url,
                page.depth,
                filtered.chars().filter(|c| !c.is_whitespace()).count()
            );
        })
        .await;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FetchedPage;
    use crate::storage::LocalStorage;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct StaticSite {
        pages: HashMap<&'static str, (&'static str, Vec<&'static str>)>,
        requests: AtomicUsize,
    }

    impl StaticSite {
        fn new() -> Self {
            let mut pages = HashMap::new();
            pages.insert(
                "https://example.jp/",
                ("メニュー検索", vec!["https://example.jp/cat"]),
            );
            pages.insert("https://example.jp/cat", ("猫が歩く。", vec![]));
            Self {
                pages,
                requests: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StaticSite {
        async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            let (text, links) = self
                .pages
                .get(url.as_str())
                .ok_or_else(|| AppError::crawl(url.as_str(), "not found"))?;
            Ok(FetchedPage {
                url: url.clone(),
                text: text.to_string(),
                links: links.iter().map(|l| Url::parse(l).unwrap()).collect(),
            })
        }
    }

    fn config(output: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.crawler.seed_url = "https://example.jp/".to_string();
        config.crawler.allowed_domains = vec!["example.jp".to_string()];
        config.output.path = output.to_path_buf();
        config
    }

    #[tokio::test]
    async fn two_page_site_report() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("output.txt");
        let config = config(&path);
        let storage = LocalStorage::from_config(&config.output);

        let stats = run_extraction(&config, StaticSite::new(), &storage)
            .await
            .unwrap();

        assert_eq!(stats.unique_chars, 4);
        assert_eq!(stats.outcome.pages_visited, 2);
        assert_eq!(stats.output_path, path);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("がく歩猫{SYMBOL_TABLE}")
        );
    }

    #[tokio::test]
    async fn empty_seed_fails_before_fetching() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("output.txt");
        let mut config = config(&path);
        config.crawler.seed_url = String::new();
        let site = StaticSite::new();
        let storage = LocalStorage::new(&path);

        let err = run_extraction(&config, &site, &storage).await.unwrap_err();

        assert!(matches!(err, AppError::Config(_)));
        assert_eq!(site.requests.load(Ordering::SeqCst), 0);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn unparsable_seed_is_config_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("output.txt");
        let mut config = config(&path);
        config.crawler.seed_url = "http://[::1".to_string();
        let site = StaticSite::new();

        let result = run_extraction(&config, &site, &LocalStorage::new(&path)).await;

        assert!(matches!(result, Err(AppError::Config(_))));
        assert_eq!(site.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_domains_fail_before_fetching() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("output.txt");
        let mut config = config(&path);
        config.crawler.allowed_domains.clear();
        let site = StaticSite::new();

        let result = run_extraction(&config, &site, &LocalStorage::new(&path)).await;

        assert!(matches!(result, Err(AppError::Config(_))));
        assert_eq!(site.requests.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unreachable_seed_still_writes_symbol_table() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("output.txt");
        let mut config = config(&path);
        config.crawler.seed_url = "https://example.jp/gone".to_string();

        let stats = run_extraction(&config, StaticSite::new(), &LocalStorage::new(&path))
            .await
            .unwrap();

        assert_eq!(stats.outcome.page_failures, 1);
        assert_eq!(stats.unique_chars, 0);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), SYMBOL_TABLE);
    }

    #[tokio::test]
    async fn write_failure_propagates() {
        let tmp = TempDir::new().unwrap();
        let config = config(&tmp.path().join("output.txt"));
        // Pointing the writer at a directory makes file creation fail.
        let storage = LocalStorage::new(tmp.path()).with_atomic(false);

        let result = run_extraction(&config, StaticSite::new(), &storage).await;
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
