//! CLI for the harvest corpus crawler.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use harvest_core::checkpoint::Stage;
use harvest_core::config;
use harvest_core::pipeline::Layout;
use std::path::PathBuf;

use commands::{run_checkpoints, run_discover, run_download, run_preprocess};

/// Top-level CLI for the harvest corpus crawler.
#[derive(Debug, Parser)]
#[command(name = "harvest")]
#[command(about = "Harvest: resilient crawler for a plain-text book corpus", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/harvest/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Root directory for data/, dump/ and the URL lists (overrides root_dir).
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Crawl search pages and item pages; write download_urls.txt.
    Discover,

    /// Download listed texts that are not in data/ yet.
    Download {
        /// Download at most N texts this run (overrides max_per_run).
        #[arg(long, value_name = "N", conflicts_with = "all")]
        max: Option<usize>,
        /// Ignore max_per_run and download everything missing.
        #[arg(long)]
        all: bool,
    },

    /// Decode and sentence-split data/*.txt into one corpus file.
    Preprocess {
        /// Output file (default <root>/corpus.txt).
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },

    /// Show checkpointed runs, or the rounds of one run.
    Checkpoints {
        /// Only runs of this stage (search, item_page, download).
        #[arg(long, value_parser = parse_stage)]
        stage: Option<Stage>,
        /// Show rounds and unresolved targets of this run.
        #[arg(long, value_name = "ID")]
        run: Option<i64>,
    },
}

fn parse_stage(s: &str) -> Result<Stage, String> {
    Stage::parse(s).ok_or_else(|| format!("unknown stage {:?} (search, item_page, download)", s))
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let mut cfg = match &cli.config {
            Some(path) => config::load_from(path)?,
            None => config::load_or_init()?,
        };
        if let Some(root) = cli.root {
            cfg.root_dir = Some(root);
        }
        tracing::debug!("loaded config: {:?}", cfg);
        let layout = Layout::from_config(&cfg)?;

        match cli.command {
            CliCommand::Discover => run_discover(&cfg, &layout).await?,
            CliCommand::Download { max, all } => {
                if all {
                    cfg.download.max_per_run = None;
                } else if max.is_some() {
                    cfg.download.max_per_run = max;
                }
                run_download(&cfg, &layout).await?;
            }
            CliCommand::Preprocess { output } => run_preprocess(&layout, output).await?,
            CliCommand::Checkpoints { stage, run } => run_checkpoints(stage, run).await?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
