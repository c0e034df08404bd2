//! Temp-file writer: payload goes to `<name>.part`, then an atomic rename.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Writer for one artifact's temp file.
pub struct PartWriter {
    file: File,
    temp_path: PathBuf,
}

impl PartWriter {
    /// Create (or truncate) the temp file at `temp_path`.
    pub fn create(temp_path: &Path) -> Result<Self> {
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)
            .with_context(|| format!("failed to create temp file: {}", temp_path.display()))?;
        Ok(PartWriter {
            file,
            temp_path: temp_path.to_path_buf(),
        })
    }

    pub fn write_all(&mut self, data: &[u8]) -> Result<()> {
        self.file
            .write_all(data)
            .with_context(|| format!("write {}", self.temp_path.display()))
    }

    /// Sync file data to disk. Call before `finalize` for durability.
    pub fn sync(&self) -> Result<()> {
        self.file.sync_all().context("artifact sync failed")?;
        Ok(())
    }

    /// Rename the temp file to `final_path`, consuming the writer.
    /// Fails if `final_path` is on a different filesystem.
    pub fn finalize(self, final_path: &Path) -> Result<()> {
        let temp_path = self.temp_path;
        drop(self.file);
        std::fs::rename(&temp_path, final_path).with_context(|| {
            format!(
                "failed to rename {} to {}",
                temp_path.display(),
                final_path.display()
            )
        })?;
        Ok(())
    }

    /// Remove the temp file after a failed write.
    pub fn abandon(self) {
        let temp_path = self.temp_path;
        drop(self.file);
        if let Err(e) = std::fs::remove_file(&temp_path) {
            tracing::debug!("could not remove {}: {}", temp_path.display(), e);
        }
    }
}
