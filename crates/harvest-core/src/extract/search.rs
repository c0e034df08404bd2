use scraper::Html;

use super::{page_text, resolve_href, selector};

/// Item page links on a search listing (`a.library-title`), in page order.
pub fn search_page_links(page_url: &str, body: &[u8]) -> Vec<String> {
    let html = Html::parse_document(&page_text(body));
    let links: Vec<String> = html
        .select(&selector("a.library-title"))
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| resolve_href(page_url, href))
        .collect();
    if links.is_empty() {
        tracing::debug!(page = page_url, "no item links on search page");
    }
    links
}
