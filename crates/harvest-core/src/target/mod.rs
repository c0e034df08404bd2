//! Targets: a URL to fetch plus the stable key derived from it.
//!
//! The stable key names the artifact on disk and drives dedup, so extraction
//! must be deterministic. A URL that does not have the expected shape is a
//! `TargetError::Malformed`, fatal to that target only.

mod key;

pub use key::KeyRule;

use serde::{Deserialize, Serialize};

/// Error raised while building a target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    /// The URL does not contain the delimiter pattern the key rule expects.
    #[error("malformed target {url}: {reason}")]
    Malformed { url: String, reason: String },
}

/// One URL to be fetched and its stable key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    url: String,
    key: String,
}

impl Target {
    /// Build a target, extracting its key with `rule`.
    pub fn new(url: impl Into<String>, rule: &KeyRule) -> Result<Self, TargetError> {
        let url = url.into();
        let key = rule.extract(&url)?;
        Ok(Self { url, key })
    }

    /// Rebuild a target from a stored (url, key) pair without re-extracting.
    pub fn from_parts(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Build targets from raw URL lines, dropping (and logging) malformed ones.
/// Blank lines are ignored; surrounding whitespace is trimmed.
pub fn targets_from_lines<'a, I>(lines: I, rule: &KeyRule) -> Vec<Target>
where
    I: IntoIterator<Item = &'a str>,
{
    lines
        .into_iter()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter_map(|line| match Target::new(line, rule) {
            Ok(t) => Some(t),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        })
        .collect()
}
