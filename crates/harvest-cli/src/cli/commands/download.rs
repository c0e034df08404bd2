//! `harvest download` – fetch listed texts into data/.

use anyhow::Result;
use harvest_core::config::HarvestConfig;
use harvest_core::pipeline::Layout;

use super::discover::print_stage;
use super::progress::spawn_progress_printer;
use super::setup::build_harvester;

pub async fn run_download(cfg: &HarvestConfig, layout: &Layout) -> Result<()> {
    let (progress_tx, progress_handle) = spawn_progress_printer();
    let harvester = build_harvester(cfg, layout, progress_tx).await?;
    let report = harvester.download().await;
    drop(harvester);
    let _ = progress_handle.await;
    let report = report?;

    if report.stage.targets == 0 {
        println!(
            "Nothing to download ({} listed, {} already in {}).",
            report.listed,
            report.already_present,
            layout.data_dir().display()
        );
        return Ok(());
    }
    print_stage(&report.stage);
    println!(
        "{} written, {} already present, {} left for a later run",
        report.written, report.already_present, report.deferred
    );
    Ok(())
}
