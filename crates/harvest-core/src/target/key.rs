//! Stable key extraction rules.

use super::TargetError;

/// How to derive a stable key from a target URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyRule {
    /// The path segment right after `delimiter`, up to the next `/`
    /// (e.g. `/download/` on `.../download/12345/1/...` gives `12345`).
    After { delimiter: String },
    /// The last non-empty segment of the URL path.
    LastSegment,
}

impl KeyRule {
    pub fn after(delimiter: impl Into<String>) -> Self {
        KeyRule::After {
            delimiter: delimiter.into(),
        }
    }

    /// Extract the key from `url`, failing fast when the expected shape is absent.
    pub fn extract(&self, url: &str) -> Result<String, TargetError> {
        let key = match self {
            KeyRule::After { delimiter } => {
                let (_, rest) = url.split_once(delimiter.as_str()).ok_or_else(|| {
                    malformed(url, format!("missing delimiter {:?}", delimiter))
                })?;
                rest.split(['/', '?', '#']).next().unwrap_or("")
            }
            KeyRule::LastSegment => {
                let parsed = url::Url::parse(url)
                    .map_err(|e| malformed(url, format!("invalid URL: {}", e)))?;
                let segment = parsed
                    .path_segments()
                    .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
                    .unwrap_or("");
                return non_empty(url, segment.to_string());
            }
        };
        non_empty(url, key.to_string())
    }
}

fn non_empty(url: &str, key: String) -> Result<String, TargetError> {
    if key.is_empty() || key == "." || key == ".." {
        return Err(malformed(url, "empty key segment".to_string()));
    }
    Ok(key)
}

fn malformed(url: &str, reason: String) -> TargetError {
    TargetError::Malformed {
        url: url.to_string(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn after_delimiter() {
        let rule = KeyRule::after("/download/");
        assert_eq!(
            rule.extract("https://www.smashwords.com/books/download/123456/6/latest/0/0/a-book.txt")
                .unwrap(),
            "123456"
        );
        assert_eq!(rule.extract("https://e.com/download/77").unwrap(), "77");
        assert_eq!(rule.extract("https://e.com/download/77?x=1").unwrap(), "77");
    }

    #[test]
    fn after_delimiter_missing_is_malformed() {
        let rule = KeyRule::after("/download/");
        let err = rule.extract("https://e.com/books/view/1").unwrap_err();
        assert!(matches!(err, TargetError::Malformed { .. }));
        assert!(rule.extract("https://e.com/download/").is_err());
    }

    #[test]
    fn last_segment() {
        let rule = KeyRule::LastSegment;
        assert_eq!(rule.extract("https://e.com/books/view/991").unwrap(), "991");
        assert_eq!(rule.extract("https://e.com/list/medium/20/").unwrap(), "20");
        assert_eq!(rule.extract("https://e.com/a/file.txt?token=abc").unwrap(), "file.txt");
    }

    #[test]
    fn last_segment_root_or_garbage_is_malformed() {
        let rule = KeyRule::LastSegment;
        assert!(rule.extract("https://e.com/").is_err());
        assert!(rule.extract("not a url").is_err());
    }

    #[test]
    fn extraction_is_deterministic() {
        let rule = KeyRule::after("/download/");
        let url = "https://e.com/download/5/x";
        assert_eq!(rule.extract(url).unwrap(), rule.extract(url).unwrap());
    }
}
