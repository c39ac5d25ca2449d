// src/services/crawler.rs

//! Site crawler service.
//!
//! Breadth-first crawl from a single seed, bounded by link depth and
//! restricted to a set of allowed hosts. Every distinct URL is fetched at most
//! once; pages within one depth level are fetched concurrently.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use regex::Regex;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CrawlOutcome, CrawlerConfig, Page};
use crate::services::PageFetcher;
use crate::utils::url::is_allowed_domain;

/// Depth-bounded, domain-restricted crawler over a [`PageFetcher`].
pub struct SiteCrawler<F> {
    fetcher: F,
    allowed_domains: Vec<String>,
    exclude: Vec<Regex>,
    max_depth: usize,
    max_concurrent: usize,
    delay: Duration,
}

impl<F: PageFetcher> SiteCrawler<F> {
    /// Create a crawler from the `[crawler]` config section.
    pub fn new(fetcher: F, config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            allowed_domains: config.allowed_domains.clone(),
            exclude: config.compile_exclude_patterns()?,
            max_depth: config.max_depth,
            max_concurrent: config.max_concurrent.max(1),
            delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    /// Whether a URL may be visited at all.
    fn permits(&self, url: &Url) -> bool {
        is_allowed_domain(url, &self.allowed_domains)
            && !self.exclude.iter().any(|re| re.is_match(url.as_str()))
    }

    /// Crawl from `seed`, calling `on_page` once per fetched page.
    ///
    /// Fetch failures are logged and counted; they never abort the crawl.
    pub async fn crawl<C>(&self, seed: &Url, on_page: C) -> CrawlOutcome
    where
        C: Fn(&Page) + Sync,
    {
        let mut outcome = CrawlOutcome::default();

        let mut seed = seed.clone();
        seed.set_fragment(None);
        if !self.permits(&seed) {
            log::warn!("Seed {} is outside the allowed domains or excluded", seed);
            outcome.links_skipped += 1;
            return outcome;
        }

        let seen = Mutex::new(HashSet::from([seed.clone()]));
        let mut frontier = vec![seed];
        let on_page = &on_page;
        let seen_ref = &seen;

        for depth in 1..=self.max_depth {
            if frontier.is_empty() {
                break;
            }
            log::info!("Depth {}: fetching {} pages", depth, frontier.len());

            let mut next = Vec::new();
            let mut results = stream::iter(std::mem::take(&mut frontier))
                .map(|url| async move {
                    let result = self.visit(&url, depth, seen_ref, on_page).await;
                    (url, result)
                })
                .buffer_unordered(self.max_concurrent);

            while let Some((url, result)) = results.next().await {
                match result {
                    Ok(Visit::Page(links)) => {
                        outcome.pages_visited += 1;
                        log::debug!("Fetched {} ({} links)", url, links.len());

                        if depth < self.max_depth {
                            let mut seen = lock(&seen);
                            for link in links {
                                if !seen.insert(link.clone()) {
                                    continue;
                                }
                                if self.permits(&link) {
                                    next.push(link);
                                } else {
                                    outcome.links_skipped += 1;
                                }
                            }
                        }
                    }
                    Ok(Visit::Duplicate(target)) => {
                        outcome.redirect_duplicates += 1;
                        log::debug!("{} redirected to already seen {}", url, target);
                    }
                    Err(error) => {
                        outcome.page_failures += 1;
                        log::warn!("Failed to fetch {}: {}", url, error);
                    }
                }

                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
            }

            frontier = next;
        }

        outcome
    }

    /// Fetch one URL and hand the page to `on_page` unless a redirect made it
    /// a repeat or took it out of bounds.
    async fn visit<C>(
        &self,
        url: &Url,
        depth: usize,
        seen: &Mutex<HashSet<Url>>,
        on_page: &C,
    ) -> Result<Visit>
    where
        C: Fn(&Page) + Sync,
    {
        let fetched = self.fetcher.fetch(url).await?;
        let mut final_url = fetched.url;
        final_url.set_fragment(None);

        if final_url != *url {
            if !self.permits(&final_url) {
                return Err(AppError::crawl(
                    url.as_str(),
                    format!("redirected outside allowed domains to {final_url}"),
                ));
            }
            if !lock(seen).insert(final_url.clone()) {
                return Ok(Visit::Duplicate(final_url));
            }
        }

        let page = Page {
            url: final_url,
            depth,
            text: fetched.text,
            links: fetched.links,
        };
        on_page(&page);
        Ok(Visit::Page(page.links))
    }
}

/// Result of a single successful fetch.
enum Visit {
    /// Links of a newly delivered page
    Page(Vec<Url>),
    /// The fetch redirected to a URL that was already visited or queued
    Duplicate(Url),
}

fn lock(seen: &Mutex<HashSet<Url>>) -> MutexGuard<'_, HashSet<Url>> {
    seen.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FetchedPage;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// In-memory site: URL -> (body text, hrefs), plus URL -> redirect target.
    #[derive(Default)]
    struct MemoryFetcher {
        pages: HashMap<String, (String, Vec<String>)>,
        redirects: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    impl MemoryFetcher {
        fn page(mut self, url: &str, text: &str, links: &[&str]) -> Self {
            self.pages.insert(
                url.to_string(),
                (
                    text.to_string(),
                    links.iter().map(|l| l.to_string()).collect(),
                ),
            );
            self
        }

        fn redirect(mut self, from: &str, to: &str) -> Self {
            self.redirects.insert(from.to_string(), to.to_string());
            self
        }
    }

    #[async_trait]
    impl PageFetcher for MemoryFetcher {
        async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.requests.lock().unwrap().push(url.to_string());
            tokio::task::yield_now().await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            let target = match self.redirects.get(url.as_str()) {
                Some(to) => Url::parse(to).unwrap(),
                None => url.clone(),
            };
            let (text, links) = self
                .pages
                .get(target.as_str())
                .ok_or_else(|| AppError::crawl(url.as_str(), "status 404 Not Found"))?;
            Ok(FetchedPage {
                text: text.clone(),
                links: links
                    .iter()
                    .filter_map(|l| crate::utils::url::resolve(&target, l))
                    .collect(),
                url: target,
            })
        }
    }

    fn config(max_depth: usize) -> CrawlerConfig {
        CrawlerConfig {
            allowed_domains: vec!["example.jp".to_string()],
            max_depth,
            ..CrawlerConfig::default()
        }
    }

    fn site() -> MemoryFetcher {
        MemoryFetcher::default()
            .page("https://example.jp/", "トップ", &["/a", "/b", "https://other.jp/x"])
            .page("https://example.jp/a", "ページA", &["/", "/b", "/c"])
            .page("https://example.jp/b", "ページB", &["/a#frag", "/missing"])
            .page("https://example.jp/c", "ページC", &["/d"])
            .page("https://example.jp/d", "ページD", &[])
    }

    fn seed() -> Url {
        Url::parse("https://example.jp/").unwrap()
    }

    async fn visited(crawler: &SiteCrawler<MemoryFetcher>) -> (Vec<(String, usize)>, CrawlOutcome) {
        visited_from(crawler, &seed()).await
    }

    async fn visited_from(
        crawler: &SiteCrawler<MemoryFetcher>,
        seed: &Url,
    ) -> (Vec<(String, usize)>, CrawlOutcome) {
        let pages = Mutex::new(Vec::new());
        let outcome = crawler
            .crawl(seed, |page| {
                pages
                    .lock()
                    .unwrap()
                    .push((page.url.to_string(), page.depth));
            })
            .await;
        let mut pages = pages.into_inner().unwrap();
        pages.sort();
        (pages, outcome)
    }

    #[tokio::test]
    async fn depth_one_visits_only_seed() {
        let crawler = SiteCrawler::new(site(), &config(1)).unwrap();
        let (pages, outcome) = visited(&crawler).await;

        assert_eq!(pages, vec![("https://example.jp/".to_string(), 1)]);
        assert_eq!(outcome.pages_visited, 1);
        assert_eq!(outcome.links_skipped, 0);
    }

    #[tokio::test]
    async fn depth_two_visits_direct_links() {
        let crawler = SiteCrawler::new(site(), &config(2)).unwrap();
        let (pages, outcome) = visited(&crawler).await;

        assert_eq!(
            pages,
            vec![
                ("https://example.jp/".to_string(), 1),
                ("https://example.jp/a".to_string(), 2),
                ("https://example.jp/b".to_string(), 2),
            ]
        );
        assert_eq!(outcome.pages_visited, 3);
        // other.jp is dropped by the domain rule.
        assert_eq!(outcome.links_skipped, 1);
    }

    #[tokio::test]
    async fn each_url_fetched_once() {
        let fetcher = site();
        let crawler = SiteCrawler::new(fetcher, &config(4)).unwrap();
        let (pages, outcome) = visited(&crawler).await;

        assert_eq!(pages.len(), 5);
        assert_eq!(outcome.pages_visited, 5);
        assert_eq!(outcome.page_failures, 1);

        let mut requests = crawler.fetcher.requests.lock().unwrap().clone();
        let total = requests.len();
        requests.sort();
        requests.dedup();
        assert_eq!(requests.len(), total);
        assert!(!requests.iter().any(|r| r.starts_with("https://other.jp")));
    }

    #[tokio::test]
    async fn failed_page_is_counted_not_fatal() {
        let crawler = SiteCrawler::new(site(), &config(3)).unwrap();
        let (pages, outcome) = visited(&crawler).await;

        assert_eq!(outcome.page_failures, 1);
        assert!(pages.iter().any(|(u, _)| u == "https://example.jp/c"));
        assert!(!pages.iter().any(|(u, _)| u == "https://example.jp/missing"));
    }

    #[tokio::test]
    async fn exclude_patterns_skip_urls() {
        let mut config = config(3);
        config.exclude_patterns = vec![r"/b$".to_string()];
        let crawler = SiteCrawler::new(site(), &config).unwrap();
        let (pages, _) = visited(&crawler).await;

        assert!(!pages.iter().any(|(u, _)| u == "https://example.jp/b"));
        assert!(pages.iter().any(|(u, _)| u == "https://example.jp/c"));
    }

    #[tokio::test]
    async fn seed_outside_domain_fetches_nothing() {
        let mut config = config(2);
        config.allowed_domains = vec!["other.jp".to_string()];
        let crawler = SiteCrawler::new(site(), &config).unwrap();
        let (pages, outcome) = visited(&crawler).await;

        assert!(pages.is_empty());
        assert_eq!(outcome.pages_visited, 0);
        assert!(crawler.fetcher.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrency_is_bounded() {
        let links: Vec<String> = (0..10).map(|i| format!("/p{i}")).collect();
        let link_refs: Vec<&str> = links.iter().map(String::as_str).collect();
        let mut fetcher = MemoryFetcher::default().page("https://example.jp/", "", &link_refs);
        for link in &links {
            fetcher = fetcher.page(&format!("https://example.jp{link}"), "", &[]);
        }

        let mut config = config(2);
        config.max_concurrent = 3;
        let crawler = SiteCrawler::new(fetcher, &config).unwrap();
        let (pages, _) = visited(&crawler).await;

        assert_eq!(pages.len(), 11);
        assert!(crawler.fetcher.peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn seed_fragment_does_not_cause_refetch() {
        let crawler = SiteCrawler::new(site(), &config(3)).unwrap();
        let seed = Url::parse("https://example.jp/#top").unwrap();
        let (pages, _) = visited_from(&crawler, &seed).await;

        // /a links back to "/", which must match the seed.
        let requests = crawler.fetcher.requests.lock().unwrap().clone();
        let top = requests.iter().filter(|r| *r == "https://example.jp/").count();
        assert_eq!(top, 1);
        assert!(!requests.iter().any(|r| r.contains('#')));
        assert!(pages.contains(&("https://example.jp/".to_string(), 1)));
    }

    #[tokio::test]
    async fn redirect_to_seen_page_is_not_processed_twice() {
        let fetcher = MemoryFetcher::default()
            .page("https://example.jp/", "トップ", &["/a", "/old"])
            .page("https://example.jp/a", "ページA", &[])
            .redirect("https://example.jp/old", "https://example.jp/a");
        let crawler = SiteCrawler::new(fetcher, &config(2)).unwrap();
        let (pages, outcome) = visited(&crawler).await;

        assert_eq!(
            pages,
            vec![
                ("https://example.jp/".to_string(), 1),
                ("https://example.jp/a".to_string(), 2),
            ]
        );
        assert_eq!(outcome.pages_visited, 2);
        assert_eq!(outcome.redirect_duplicates, 1);
    }

    #[tokio::test]
    async fn redirected_page_reports_final_url_and_links() {
        let fetcher = MemoryFetcher::default()
            .page("https://example.jp/", "トップ", &["/old"])
            .page("https://example.jp/new/", "新しい", &["next"])
            .page("https://example.jp/new/next", "次", &[])
            .redirect("https://example.jp/old", "https://example.jp/new/");
        let crawler = SiteCrawler::new(fetcher, &config(3)).unwrap();

        let delivered = Mutex::new(Vec::new());
        crawler
            .crawl(&seed(), |page| {
                delivered.lock().unwrap().push((
                    page.url.to_string(),
                    page.links.iter().map(Url::to_string).collect::<Vec<_>>(),
                ));
            })
            .await;
        let delivered = delivered.into_inner().unwrap();

        assert!(delivered.contains(&(
            "https://example.jp/new/".to_string(),
            vec!["https://example.jp/new/next".to_string()],
        )));
        assert!(delivered.iter().any(|(u, _)| u == "https://example.jp/new/next"));
    }

    #[tokio::test]
    async fn redirect_off_domain_counts_as_failure() {
        let fetcher = MemoryFetcher::default()
            .page("https://example.jp/", "トップ", &["/out"])
            .page("https://other.jp/x", "外部", &[])
            .redirect("https://example.jp/out", "https://other.jp/x");
        let crawler = SiteCrawler::new(fetcher, &config(2)).unwrap();
        let (pages, outcome) = visited(&crawler).await;

        assert_eq!(pages, vec![("https://example.jp/".to_string(), 1)]);
        assert_eq!(outcome.page_failures, 1);
    }

    #[test]
    fn invalid_exclude_pattern_rejected() {
        let mut config = config(2);
        config.exclude_patterns = vec!["(".to_string()];
        assert!(SiteCrawler::new(site(), &config).is_err());
    }
}
