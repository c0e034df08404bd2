//! Drop targets whose artifact already exists, before any network activity.

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::target::Target;

/// Keep targets whose key is not in `existing_keys`, preserving order.
pub fn filter(targets: Vec<Target>, existing_keys: &HashSet<String>) -> Vec<Target> {
    let before = targets.len();
    let kept: Vec<Target> = targets
        .into_iter()
        .filter(|t| !existing_keys.contains(t.key()))
        .collect();
    if kept.len() != before {
        tracing::info!(
            skipped = before - kept.len(),
            remaining = kept.len(),
            "dropped targets with existing artifacts"
        );
    }
    kept
}

/// Stems of files in `dir` with extension `ext`. A missing directory has no keys.
pub fn existing_keys(dir: &Path, ext: &str) -> Result<HashSet<String>> {
    let mut keys = HashSet::new();
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(keys),
        Err(e) => return Err(e).with_context(|| format!("read dir {}", dir.display())),
    };
    for entry in entries {
        let path = entry
            .with_context(|| format!("read dir {}", dir.display()))?
            .path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(ext) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            keys.insert(stem.to_string());
        }
    }
    Ok(keys)
}
