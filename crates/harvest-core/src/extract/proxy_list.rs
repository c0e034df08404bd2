use scraper::Html;

use super::{page_text, selector};
use crate::identity::{parse_proxy_line, ProxyEndpoint};

/// HTTPS-capable proxies from a free proxy list table (`table#proxylisttable`).
/// Column 1 is the host, column 2 the port, column 7 the "Https" flag.
pub fn proxy_list_endpoints(body: &[u8]) -> Vec<ProxyEndpoint> {
    let html = Html::parse_document(&page_text(body));
    let td = selector("td");
    let mut proxies = Vec::new();
    for row in html.select(&selector("table#proxylisttable tbody tr")) {
        let cells: Vec<String> = row
            .select(&td)
            .map(|c| c.text().collect::<String>().trim().to_string())
            .collect();
        if cells.len() < 7 || !cells[6].contains("yes") {
            continue;
        }
        if let Some(proxy) = parse_proxy_line(&format!("{}:{}", cells[0], cells[1])) {
            proxies.push(proxy);
        }
    }
    tracing::debug!(count = proxies.len(), "parsed proxy list");
    proxies
}
