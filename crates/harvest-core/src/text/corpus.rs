//! Corpus assembly: every text artifact, decoded and segmented, in key order.

use anyhow::{Context, Result};
use std::path::Path;

use super::{decode, segment};
use crate::artifact::{temp_path, ArtifactStore, PartWriter};

/// Written after each document.
pub const DOCUMENT_SEPARATOR: &str = "\n\n\n";

/// Counts from one `build_corpus` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CorpusStats {
    pub documents: usize,
    /// Documents that decoded to nothing.
    pub empty: usize,
    pub bytes_written: u64,
}

/// Decode and segment every artifact in `store`, writing them to `out` in key
/// order. The output appears atomically once complete.
pub fn build_corpus(store: &ArtifactStore, out: &Path) -> Result<CorpusStats> {
    if !store.dir().is_dir() {
        anyhow::bail!("data dir does not exist: {}", store.dir().display());
    }
    let paths = store.sorted_paths()?;
    tracing::info!(documents = paths.len(), "building corpus into {}", out.display());

    let mut writer = PartWriter::create(&temp_path(out))?;
    let mut stats = CorpusStats::default();
    for (i, path) in paths.iter().enumerate() {
        let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let sentences = segment(&decode(&bytes));
        if sentences.is_empty() {
            stats.empty += 1;
            tracing::debug!("no text in {}", path.display());
        }
        writer.write_all(sentences.as_bytes())?;
        writer.write_all(DOCUMENT_SEPARATOR.as_bytes())?;
        stats.documents += 1;
        stats.bytes_written += (sentences.len() + DOCUMENT_SEPARATOR.len()) as u64;
        if (i + 1) % 1000 == 0 {
            tracing::info!("segmented {}/{} documents", i + 1, paths.len());
        }
    }
    writer.sync()?;
    writer.finalize(out)?;
    tracing::info!(
        documents = stats.documents,
        empty = stats.empty,
        bytes = stats.bytes_written,
        "corpus written"
    );
    Ok(stats)
}
