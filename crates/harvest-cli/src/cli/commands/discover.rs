//! `harvest discover` – search pages and item pages to download URLs.

use anyhow::Result;
use harvest_core::config::HarvestConfig;
use harvest_core::pipeline::{Layout, StageReport};

use super::progress::spawn_progress_printer;
use super::setup::build_harvester;

pub(super) fn print_stage(stage: &StageReport) {
    let r = &stage.report;
    print!(
        "{:<10} {} target(s), {} fetched in {} round(s)",
        stage.stage,
        stage.targets,
        r.succeeded,
        r.rounds_run()
    );
    if r.gave_up() {
        print!(", {} failed", r.failed.len());
    }
    if let Some(id) = stage.run_id {
        print!(" [run {}]", id);
    }
    println!();
}

pub async fn run_discover(cfg: &HarvestConfig, layout: &Layout) -> Result<()> {
    let (progress_tx, progress_handle) = spawn_progress_printer();
    let harvester = build_harvester(cfg, layout, progress_tx).await?;
    let report = harvester.discover().await;
    drop(harvester);
    let _ = progress_handle.await;
    let report = report?;

    print_stage(&report.search);
    print_stage(&report.item_pages);
    println!(
        "{} item page(s) -> {}",
        report.item_page_urls,
        layout.item_page_urls_path().display()
    );
    println!(
        "{} download URL(s) -> {}",
        report.download_urls,
        layout.download_urls_path().display()
    );
    Ok(())
}
