use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::HarvestConfig;

/// Directory layout under the harvest root.
///
/// ```text
/// <root>/download_urls.txt      text download URLs (discover -> download)
/// <root>/data/<key>.txt         downloaded texts
/// <root>/dump/item_page_urls.txt
/// <root>/corpus.txt             preprocess output
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `root_dir` from the config, else the current directory.
    pub fn from_config(cfg: &HarvestConfig) -> Result<Self> {
        match &cfg.root_dir {
            Some(dir) => Ok(Self::new(dir)),
            None => Ok(Self::new(
                std::env::current_dir().context("current directory")?,
            )),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn dump_dir(&self) -> PathBuf {
        self.root.join("dump")
    }

    pub fn item_page_urls_path(&self) -> PathBuf {
        self.dump_dir().join("item_page_urls.txt")
    }

    pub fn download_urls_path(&self) -> PathBuf {
        self.root.join("download_urls.txt")
    }

    pub fn corpus_path(&self) -> PathBuf {
        self.root.join("corpus.txt")
    }

    /// Resolve a configured path against the root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        HarvestConfig::resolve(&self.root, path)
    }

    /// Create `data/` and `dump/`.
    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [self.data_dir(), self.dump_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create dir {}", dir.display()))?;
        }
        Ok(())
    }
}
