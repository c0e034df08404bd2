//! Page extractors: turn a fetched page into the next stage's targets.
//!
//! Extractors are pure functions of the page URL and body. A page that does
//! not have the expected shape yields an empty list and a log line; it is
//! never an error for the pipeline.

mod item_page;
mod proxy_list;
mod search;

pub use item_page::{item_page_download_link, BookMeta};
pub use proxy_list::proxy_list_endpoints;
pub use search::search_page_links;

use scraper::Selector;
use url::Url;

use crate::target::{KeyRule, Target};

/// Which crawl page a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKind {
    /// Search listing; yields item page URLs.
    Search,
    /// Item page; yields at most one text download URL.
    ItemPage,
}

/// Targets found on a fetched page, keyed with `rule`.
pub fn extract_targets(kind: PageKind, page_url: &str, body: &[u8], rule: &KeyRule) -> Vec<Target> {
    let links = match kind {
        PageKind::Search => search_page_links(page_url, body),
        PageKind::ItemPage => item_page_download_link(page_url, body).into_iter().collect(),
    };
    links
        .into_iter()
        .filter_map(|link| match Target::new(link, rule) {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!(page = page_url, "{}", e);
                None
            }
        })
        .collect()
}

/// Pages are served as UTF-8; invalid bytes are replaced rather than rejected.
pub(crate) fn page_text(body: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(body)
}

/// Resolve `href` against the page it was found on. Unparseable hrefs are dropped.
pub(crate) fn resolve_href(page_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match Url::parse(page_url) {
        Ok(base) => base.join(href).ok().map(String::from),
        Err(_) => Url::parse(href).ok().map(String::from),
    }
}

/// Parse a literal CSS selector. Panics on invalid syntax.
pub(crate) fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {css}: {e}"))
}
