// src/utils/url.rs

//! URL manipulation utilities.

use url::Url;

/// Resolve a potentially relative href against the page URL.
///
/// Returns `None` for unparsable hrefs and for non-http(s) targets such as
/// `mailto:` or `javascript:`. The fragment is stripped so `page#a` and
/// `page#b` count as one URL.
///
/// # Examples
/// ```
/// use mojiset::utils::url::resolve;
/// use url::Url;
///
/// let base = Url::parse("https://example.jp/docs/").unwrap();
/// assert_eq!(
///     resolve(&base, "intro.html#top").unwrap().as_str(),
///     "https://example.jp/docs/intro.html"
/// );
/// ```
pub fn resolve(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }

    let mut url = base.join(href).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Extract the lowercased host from a URL.
pub fn get_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Whether the URL's host exactly matches one of `allowed` (case-insensitive).
pub fn is_allowed_domain(url: &Url, allowed: &[String]) -> bool {
    match get_domain(url) {
        Some(host) => allowed
            .iter()
            .any(|d| d.trim().eq_ignore_ascii_case(&host)),
        None => false,
    }
}
