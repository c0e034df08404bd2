use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};

use super::{Harvester, StageReport};
use crate::checkpoint::Stage;
use crate::extract::{extract_targets, PageKind};
use crate::fetch::Transport;
use crate::target::{targets_from_lines, KeyRule, Target};

/// Results of the search and item page stages.
#[derive(Debug, Clone)]
pub struct DiscoverReport {
    pub search: StageReport,
    pub item_pages: StageReport,
    /// Item page URLs found on search pages.
    pub item_page_urls: usize,
    /// Text download URLs written to `download_urls.txt`.
    pub download_urls: usize,
}

fn create_lines_file(path: &std::path::Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    Ok(BufWriter::new(file))
}

impl<T: Transport + 'static> Harvester<T> {
    /// Search pages, then item pages. Rewrites the item page dump and the
    /// download URL list from scratch.
    pub async fn discover(&self) -> Result<DiscoverReport> {
        self.layout.ensure_dirs()?;

        let search_urls = self.config.discovery.search_urls();
        let search_targets =
            targets_from_lines(search_urls.iter().map(String::as_str), &KeyRule::LastSegment);

        let item_path = self.layout.item_page_urls_path();
        let mut item_file = create_lines_file(&item_path)?;
        let mut item_pages: Vec<Target> = Vec::new();
        let search = self
            .run_stage(Stage::Search, search_targets, |page, body| {
                for t in extract_targets(PageKind::Search, page.url(), body, &KeyRule::LastSegment) {
                    writeln!(item_file, "{}", t.url())?;
                    item_pages.push(t);
                }
                Ok(())
            })
            .await;
        item_file
            .flush()
            .with_context(|| format!("write {}", item_path.display()))?;
        let item_page_urls = item_pages.len();
        tracing::info!(item_page_urls, "wrote {}", item_path.display());

        let rule = KeyRule::after(self.config.download.key_delimiter.clone());
        let download_path = self.layout.download_urls_path();
        let mut download_file = create_lines_file(&download_path)?;
        let mut download_urls = 0usize;
        let item_stage = self
            .run_stage(Stage::ItemPage, item_pages, |page, body| {
                for t in extract_targets(PageKind::ItemPage, page.url(), body, &rule) {
                    writeln!(download_file, "{}", t.url())?;
                    download_urls += 1;
                }
                Ok(())
            })
            .await;
        download_file
            .flush()
            .with_context(|| format!("write {}", download_path.display()))?;
        tracing::info!(download_urls, "wrote {}", download_path.display());

        Ok(DiscoverReport {
            search,
            item_pages: item_stage,
            item_page_urls,
            download_urls,
        })
    }
}
