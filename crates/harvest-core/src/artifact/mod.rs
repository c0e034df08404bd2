//! On-disk artifacts: one file per fetched target, named `<key>.<ext>`.
//!
//! Artifacts are written once. The payload lands in a `.part` temp file
//! first and is renamed into place, so a crash never leaves a truncated
//! artifact that dedup would then treat as done.

mod writer;

pub use writer::PartWriter;

use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::dedup;
use crate::target::Target;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Extension of downloaded text artifacts.
pub const TEXT_EXT: &str = "txt";

/// Path for the temp file: appends `.part` to the final path (e.g. `42.txt` → `42.txt.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// What `ArtifactStore::write` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written,
    /// The artifact was already on disk and was left untouched.
    AlreadyExists,
}

/// Directory of artifacts sharing one extension.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    ext: String,
}

impl ArtifactStore {
    pub fn new(dir: impl Into<PathBuf>, ext: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            ext: ext.into(),
        }
    }

    /// Store for `*.txt` artifacts in `dir`.
    pub fn text(dir: impl Into<PathBuf>) -> Self {
        Self::new(dir, TEXT_EXT)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the artifact directory if needed.
    pub fn ensure_dir(&self) -> Result<()> {
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create dir {}", self.dir.display()))
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, self.ext))
    }

    pub fn exists(&self, key: &str) -> bool {
        self.path_for(key).exists()
    }

    /// Keys of artifacts already on disk.
    pub fn keys(&self) -> Result<HashSet<String>> {
        dedup::existing_keys(&self.dir, &self.ext)
    }

    /// Artifact paths sorted by key.
    pub fn sorted_paths(&self) -> Result<Vec<PathBuf>> {
        let mut keys: Vec<String> = self.keys()?.into_iter().collect();
        keys.sort();
        Ok(keys.iter().map(|k| self.path_for(k)).collect())
    }

    /// Write the payload for `target` unless its artifact already exists.
    pub fn write(&self, target: &Target, payload: &[u8]) -> Result<WriteOutcome> {
        let final_path = self.path_for(target.key());
        if final_path.exists() {
            tracing::info!(url = target.url(), "artifact already exists: {}", final_path.display());
            return Ok(WriteOutcome::AlreadyExists);
        }

        let mut writer = PartWriter::create(&temp_path(&final_path))?;
        if let Err(e) = writer.write_all(payload).and_then(|_| writer.sync()) {
            writer.abandon();
            return Err(e);
        }
        writer.finalize(&final_path)?;
        tracing::debug!(bytes = payload.len(), "wrote {}", final_path.display());
        Ok(WriteOutcome::Written)
    }
}
