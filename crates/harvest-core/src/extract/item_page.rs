use scraper::Html;
use serde::Deserialize;

use super::{page_text, resolve_href, selector};

const BOOK_MARKER: &str = "window.angularData.book = ";
const PLAIN_TEXT_TITLE: &str = "Plain text; contains no formatting";

#[derive(Debug, Deserialize)]
struct Language {
    name: String,
}

/// Fields of the embedded book JSON the item stage looks at.
#[derive(Debug, Deserialize)]
pub struct BookMeta {
    language: Option<Language>,
    #[serde(default)]
    formats: serde_json::Value,
}

impl BookMeta {
    pub fn language(&self) -> Option<&str> {
        self.language.as_ref().map(|l| l.name.as_str())
    }

    /// `formats` is a list of names on current pages; older pages used an object keyed by name.
    pub fn has_format(&self, name: &str) -> bool {
        match &self.formats {
            serde_json::Value::Array(items) => items.iter().any(|v| v.as_str() == Some(name)),
            serde_json::Value::Object(map) => map.contains_key(name),
            _ => false,
        }
    }

    /// Parse the object assigned in `window.angularData.book = {...};`.
    pub fn from_script(script: &str) -> Option<Self> {
        let (_, rest) = script.split_once(BOOK_MARKER)?;
        let object = match rest.split_once("};") {
            Some((head, _)) => format!("{}}}", head),
            None => rest.trim_end().trim_end_matches(';').to_string(),
        };
        match serde_json::from_str(&object) {
            Ok(meta) => Some(meta),
            Err(e) => {
                tracing::debug!("book JSON did not parse: {}", e);
                None
            }
        }
    }
}

/// Plain-text download URL of an English book offered as TXT, if any.
pub fn item_page_download_link(page_url: &str, body: &[u8]) -> Option<String> {
    let html = Html::parse_document(&page_text(body));

    let meta = html
        .select(&selector("script"))
        .map(|s| s.text().collect::<String>())
        .find(|text| text.contains(BOOK_MARKER))
        .and_then(|text| BookMeta::from_script(&text));
    let Some(meta) = meta else {
        tracing::warn!(page = page_url, "item page has no book metadata");
        return None;
    };

    if meta.language() != Some("English") || !meta.has_format("TXT") {
        tracing::debug!(page = page_url, language = ?meta.language(), "not an English TXT book");
        return None;
    }

    let link = html
        .select(&selector(r#"a[title="Plain text; contains no formatting"]"#))
        .find_map(|a| a.value().attr("href"))
        .and_then(|href| resolve_href(page_url, href));
    if link.is_none() {
        tracing::warn!(page = page_url, "no \"{}\" link on item page", PLAIN_TEXT_TITLE);
    }
    link
}
