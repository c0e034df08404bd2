//! Tests for preprocess and checkpoints subcommands.

use super::parse;
use crate::cli::{Cli, CliCommand};
use clap::Parser;
use harvest_core::checkpoint::Stage;

#[test]
fn cli_parse_preprocess() {
    match parse(&["harvest", "preprocess"]) {
        CliCommand::Preprocess { output } => assert!(output.is_none()),
        _ => panic!("expected Preprocess"),
    }
    match parse(&["harvest", "preprocess", "-o", "replica.txt"]) {
        CliCommand::Preprocess { output } => {
            assert_eq!(output.as_deref(), Some(std::path::Path::new("replica.txt")))
        }
        _ => panic!("expected Preprocess with -o"),
    }
}

#[test]
fn cli_parse_checkpoints() {
    match parse(&["harvest", "checkpoints"]) {
        CliCommand::Checkpoints { stage, run } => {
            assert!(stage.is_none());
            assert!(run.is_none());
        }
        _ => panic!("expected Checkpoints"),
    }
}

#[test]
fn cli_parse_checkpoints_stage_and_run() {
    match parse(&["harvest", "checkpoints", "--stage", "item_page", "--run", "7"]) {
        CliCommand::Checkpoints { stage, run } => {
            assert_eq!(stage, Some(Stage::ItemPage));
            assert_eq!(run, Some(7));
        }
        _ => panic!("expected Checkpoints with filters"),
    }
}

#[test]
fn cli_parse_checkpoints_unknown_stage() {
    assert!(Cli::try_parse_from(["harvest", "checkpoints", "--stage", "bogus"]).is_err());
}

#[test]
fn cli_parse_unknown_command() {
    assert!(Cli::try_parse_from(["harvest", "status"]).is_err());
}
