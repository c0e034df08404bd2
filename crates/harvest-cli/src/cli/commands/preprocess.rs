//! `harvest preprocess` – build the sentence-per-line corpus.

use anyhow::Result;
use harvest_core::pipeline::{self, Layout};
use std::path::PathBuf;

pub async fn run_preprocess(layout: &Layout, output: Option<PathBuf>) -> Result<()> {
    let layout = layout.clone();
    let out = output.unwrap_or_else(|| layout.corpus_path());
    let target = out.clone();
    let stats =
        tokio::task::spawn_blocking(move || pipeline::preprocess(&layout, Some(&target))).await??;
    println!(
        "{} document(s) ({} empty), {} bytes -> {}",
        stats.documents,
        stats.empty,
        stats.bytes_written,
        out.display()
    );
    Ok(())
}
