// streamguard/src/commands/scan.rs
//! The `scan` command: one-shot detection over the whole input.
//!
//! Reports rule names, counts and sample hashes only. The input itself is
//! never echoed.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::info;
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use streamguard_core::{headless_scan, EngineKind, RedactionSummaryItem};

use super::{error_msg, load_rule_table, open_input, success_msg};
use crate::cli::ScanCommand;
use crate::ui::redaction_summary::{print_summary, total_occurrences};
use crate::ui::theme::ThemeMap;

#[derive(Debug, Clone)]
pub struct ScanOptions {
    pub input_file: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub engine: EngineKind,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub fail_over_threshold: Option<usize>,
    pub json_stdout: bool,
    pub quiet: bool,
}

impl ScanOptions {
    pub fn from_command(cmd: ScanCommand, quiet: bool) -> Self {
        Self {
            input_file: cmd.rules.input_file,
            config: cmd.rules.config,
            engine: cmd.rules.engine.into(),
            enable: cmd.rules.enable,
            disable: cmd.rules.disable,
            fail_over_threshold: cmd.fail_over_threshold,
            json_stdout: cmd.json_stdout,
            quiet,
        }
    }
}

/// What `scan --json-stdout` prints.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub engine: String,
    pub total_occurrences: usize,
    pub rules: Vec<RedactionSummaryItem>,
}

/// Outcome of a scan, for the exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    WithinThreshold,
    ThresholdExceeded,
}

pub fn run_scan(opts: ScanOptions, theme: &ThemeMap) -> Result<ScanOutcome> {
    info!("Starting scan operation.");

    let table = load_rule_table(opts.config.as_deref(), &opts.enable, &opts.disable)?;
    let mut input = String::new();
    open_input(opts.input_file.as_deref())?
        .read_to_string(&mut input)
        .context("Failed to read input")?;

    let summary = headless_scan(&table, opts.engine, &input).context("Scan failed")?;
    let total = total_occurrences(&summary);

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if opts.json_stdout {
        let report = ScanReport {
            engine: format!("{:?}", opts.engine).to_lowercase(),
            total_occurrences: total,
            rules: summary,
        };
        serde_json::to_writer_pretty(&mut out, &report).context("Failed to serialize scan report")?;
        writeln!(out)?;
    } else {
        let supports_color = stdout.is_terminal();
        print_summary(&summary, &mut out, theme, supports_color)?;
    }
    out.flush()?;

    match opts.fail_over_threshold {
        Some(threshold) if total > threshold => {
            error_msg(
                format!("{} detections exceed the threshold of {}.", total, threshold),
                theme,
            );
            Ok(ScanOutcome::ThresholdExceeded)
        }
        Some(threshold) => {
            if !opts.quiet {
                success_msg(format!("{} detections, within the threshold of {}.", total, threshold), theme);
            }
            Ok(ScanOutcome::WithinThreshold)
        }
        None => Ok(ScanOutcome::WithinThreshold),
    }
}
