// src/services/fetcher.rs

//! Page fetching.
//!
//! [`PageFetcher`] is the seam between the crawl loop and the network; the
//! crawler only ever sees body text and absolute links.

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::LOCATION;
use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, FetchedPage};
use crate::utils::http::create_async_client;
use crate::utils::url::{is_allowed_domain, resolve};

/// Source of page text and outgoing links.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage>;
}

#[async_trait]
impl<'a, T: PageFetcher + ?Sized> PageFetcher for &'a T {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        (**self).fetch(url).await
    }
}

/// Fetches pages over HTTP and extracts `<body>` text and `a[href]` links.
///
/// Redirects are only followed within the configured allowed domains.
pub struct HttpFetcher {
    client: Client,
    allowed_domains: Vec<String>,
}

impl HttpFetcher {
    /// Create a fetcher with its own configured client.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            allowed_domains: config.allowed_domains.clone(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        // The client stops at the first off-domain hop and hands back the 3xx.
        if status.is_redirection() {
            if let Some(target) = response.headers().get(LOCATION) {
                let target = target.to_str().unwrap_or("<invalid location>");
                return Err(AppError::crawl(
                    url.as_str(),
                    format!("redirected outside allowed domains to {target}"),
                ));
            }
        }
        if !status.is_success() {
            return Err(AppError::crawl(url.as_str(), format!("status {status}")));
        }

        // Redirects may land on another path; links resolve against the final URL.
        let final_url = response.url().clone();
        if !is_allowed_domain(&final_url, &self.allowed_domains) {
            return Err(AppError::crawl(
                url.as_str(),
                format!("redirected outside allowed domains to {final_url}"),
            ));
        }
        let html = response.text().await?;
        parse_page(&final_url, &html)
    }
}

/// Extract body text and resolved links from an HTML document.
pub fn parse_page(base: &Url, html: &str) -> Result<FetchedPage> {
    let document = Html::parse_document(html);
    let link_sel = parse_selector("a[href]")?;
    let text = body_text(&document)?;

    let links = document
        .select(&link_sel)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve(base, href))
        .collect();

    Ok(FetchedPage {
        url: base.clone(),
        text,
        links,
    })
}

/// Extract the body text of an HTML document without resolving links.
pub fn html_text(html: &str) -> Result<String> {
    body_text(&Html::parse_document(html))
}

fn body_text(document: &Html) -> Result<String> {
    let body_sel = parse_selector("body")?;
    Ok(document
        .select(&body_sel)
        .next()
        .map(|body| body.text().collect::<String>())
        .unwrap_or_default())
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}
