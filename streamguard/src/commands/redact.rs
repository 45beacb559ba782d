// streamguard/src/commands/redact.rs
//! The `redact` command: streams input through a session and writes each
//! safe emission as soon as the session releases it.
//!
//! Reading and writing run on blocking threads; the session itself is driven
//! by `run_pipeline` on the async runtime, connected through bounded channels.

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::{debug, info};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tokio::sync::mpsc;

use streamguard_core::config::{merge_rules, RuleTable, StreamConfig};
use streamguard_core::{run_pipeline, EngineKind, SessionStats, StreamSession};

use super::{info_msg, load_rule_table, open_input};
use crate::cli::RedactCommand;
use crate::ui::redaction_summary;
use crate::ui::theme::ThemeMap;
use crate::utils::fragments::{feed_fragments, Fragmenting};

const CHANNEL_CAPACITY: usize = 64;

/// Options for a `redact` run, independent of how they were parsed.
#[derive(Debug, Clone)]
pub struct RedactOptions {
    pub input_file: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub engine: EngineKind,
    /// Session settings given on the command line; they win over the rule table.
    pub stream_overrides: StreamConfig,
    pub fragmenting: Fragmenting,
    pub enable: Vec<String>,
    pub disable: Vec<String>,
    pub no_redaction_summary: bool,
    pub quiet: bool,
}

impl RedactOptions {
    pub fn from_command(cmd: RedactCommand, quiet: bool) -> Self {
        let fragmenting = match (cmd.fragment_size, cmd.line_buffered) {
            (Some(n), _) => Fragmenting::Chars(n),
            (None, true) => Fragmenting::Lines,
            (None, false) => Fragmenting::Blocks,
        };
        Self {
            input_file: cmd.rules.input_file,
            output: cmd.output,
            config: cmd.rules.config,
            engine: cmd.rules.engine.into(),
            stream_overrides: StreamConfig {
                buffer_size: cmd.buffer_size,
                safety_margin: cmd.safety_margin,
                boundary_window: cmd.boundary_window,
                boundary_chars: None,
                partial_match_check: cmd.no_partial_check.then_some(false),
                on_unsafe_cut: cmd.unsafe_cut.map(Into::into),
            },
            fragmenting,
            enable: cmd.rules.enable,
            disable: cmd.rules.disable,
            no_redaction_summary: cmd.no_summary,
            quiet,
        }
    }
}

/// Runs one redaction stream from start to finish.
pub async fn run_redact(opts: RedactOptions, theme: &ThemeMap) -> Result<SessionStats> {
    info!("Starting redact operation.");

    let table = load_rule_table(opts.config.as_deref(), &opts.enable, &opts.disable)?;
    let overrides = RuleTable { stream: opts.stream_overrides.clone(), ..Default::default() };
    let table = merge_rules(table, Some(overrides));
    let session = StreamSession::from_rule_table(&table, opts.engine).context("Failed to start stream session")?;
    debug!("Session settings: {:?}", session.config());

    let reader = open_input(opts.input_file.as_deref())?;
    let mut writer: Box<dyn Write + Send> = match &opts.output {
        Some(path) => Box::new(
            fs::File::create(path).with_context(|| format!("Failed to create output file {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };

    let (fragment_tx, fragment_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);
    let (output_tx, mut output_rx) = mpsc::channel::<String>(CHANNEL_CAPACITY);

    let mode = opts.fragmenting;
    let producer = tokio::task::spawn_blocking(move || {
        feed_fragments(reader, mode, |fragment| fragment_tx.blocking_send(fragment).is_ok())
    });
    let consumer = tokio::task::spawn_blocking(move || -> Result<()> {
        while let Some(safe) = output_rx.blocking_recv() {
            writer.write_all(safe.as_bytes()).context("Failed to write output")?;
            writer.flush().context("Failed to flush output")?;
        }
        Ok(())
    });

    let pipeline = run_pipeline(session, fragment_rx, output_tx).await;
    let read_result = producer.await.context("Input reader task failed")?;
    let write_result = consumer.await.context("Output writer task failed")?;

    let session = pipeline.context("Redaction failed")?;
    read_result?;
    write_result?;

    if let Some(path) = &opts.output {
        if !opts.quiet {
            info_msg(format!("Redacted output written to {}", path.display()), theme);
        }
    }
    if !opts.no_redaction_summary && !opts.quiet {
        let stderr_supports_color = io::stderr().is_terminal();
        let mut stderr = io::stderr();
        redaction_summary::print_summary(session.summary(), &mut stderr, theme, stderr_supports_color)?;
        redaction_summary::print_session_stats(session.stats(), &mut stderr, theme, stderr_supports_color)?;
    }

    info!("Redact operation completed.");
    Ok(session.stats().clone())
}
