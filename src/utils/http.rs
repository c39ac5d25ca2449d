// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::redirect::Policy;

use crate::error::Result;
use crate::models::CrawlerConfig;
use crate::utils::url::is_allowed_domain;

/// Redirect hops followed before a request fails.
pub const MAX_REDIRECTS: usize = 10;

/// Create a configured asynchronous HTTP client.
///
/// Redirects are followed only while they stay inside
/// `config.allowed_domains`; an off-list hop is returned as the 3xx response.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .redirect(redirect_policy(config.allowed_domains.clone()))
        .build()?;
    Ok(client)
}

fn redirect_policy(allowed_domains: Vec<String>) -> Policy {
    Policy::custom(move |attempt| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if is_allowed_domain(attempt.url(), &allowed_domains) {
            attempt.follow()
        } else {
            attempt.stop()
        }
    })
}
