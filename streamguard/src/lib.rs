// streamguard/src/lib.rs
//! # StreamGuard CLI Application
//!
//! This crate provides the command-line interface for the StreamGuard
//! redaction engine: `redact` streams text through a session, `scan`
//! reports what would be redacted.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
pub mod utils;

use anyhow::Result;
use std::process::ExitCode;

use cli::{Cli, Commands};
use commands::redact::{run_redact, RedactOptions};
use commands::scan::{run_scan, ScanOptions, ScanOutcome};
use ui::theme::ThemeMap;

/// Dispatches a parsed command line.
pub async fn run(cli: Cli, theme: &ThemeMap) -> Result<ExitCode> {
    match cli.command {
        Commands::Redact(cmd) => {
            run_redact(RedactOptions::from_command(cmd, cli.quiet), theme).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Scan(cmd) => match run_scan(ScanOptions::from_command(cmd, cli.quiet), theme)? {
            ScanOutcome::WithinThreshold => Ok(ExitCode::SUCCESS),
            ScanOutcome::ThresholdExceeded => Ok(ExitCode::from(1)),
        },
    }
}
