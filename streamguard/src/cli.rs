// streamguard/src/cli.rs
//! Command-line surface of `streamguard`: global flags, the `redact` and
//! `scan` subcommands, and the arguments both of them share.
//! License: MIT OR APACHE 2.0

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use streamguard_core::{EngineKind, UnsafeCutPolicy};

#[derive(Parser, Debug)]
#[command(
    name = "streamguard",
    author = "StreamGuard Team",
    version = env!("CARGO_PKG_VERSION"),
    about = "Redact sensitive data from streamed text",
    long_about = "StreamGuard redacts sensitive values (SSNs, card numbers, bank numbers, dates, addresses) from text that arrives in pieces, such as the output of a generative model. Text is released as soon as it is safe, and a value split across pieces is still caught.",
    arg_required_else_help = true,
)]
pub struct Cli {
    #[arg(long, short = 'q', global = true, help = "Only print errors to stderr.")]
    pub quiet: bool,

    /// Overrides RUST_LOG.
    #[arg(long, short = 'd', global = true, help = "Log at debug level. Matched values stay masked unless STREAMGUARD_ALLOW_DEBUG_PII=true.")]
    pub debug: bool,

    #[arg(long = "theme", value_name = "FILE", global = true, help = "YAML file mapping message kinds to colors.")]
    pub theme: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// All available commands for the `streamguard` CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Streams an input file or stdin through a redaction session.
    #[command(about = "Streams an input file or stdin through a redaction session, writing safe output as it is produced.")]
    Redact(RedactCommand),

    /// Scans an input for sensitive data and reports counts without redacting.
    #[command(about = "Scans an input for sensitive data and reports per-rule counts without redacting.")]
    Scan(ScanCommand),
}

/// Which detection backend to use.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineChoice {
    /// Pattern rules from the rule table
    #[default]
    Regex,
    /// Statistical entity recognition
    Entity,
    /// Pattern rules, then entity recognition
    Hybrid,
}

impl From<EngineChoice> for EngineKind {
    fn from(choice: EngineChoice) -> Self {
        match choice {
            EngineChoice::Regex => EngineKind::Regex,
            EngineChoice::Entity => EngineKind::Entity,
            EngineChoice::Hybrid => EngineKind::Hybrid,
        }
    }
}

/// What to do when no boundary in the search window is safe to cut at.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsafeCutChoice {
    /// Cut at the nearest boundary anyway (default)
    Fallback,
    /// Keep buffering until a safe cut appears
    Hold,
}

impl From<UnsafeCutChoice> for UnsafeCutPolicy {
    fn from(choice: UnsafeCutChoice) -> Self {
        match choice {
            UnsafeCutChoice::Hold => UnsafeCutPolicy::Hold,
            UnsafeCutChoice::Fallback => UnsafeCutPolicy::Fallback,
        }
    }
}

/// Where the text comes from and which rules look at it.
#[derive(Args, Debug, Clone)]
pub struct RuleArgs {
    #[arg(long, short = 'i', value_name = "FILE", help = "Read from FILE. Standard input is used when omitted.")]
    pub input_file: Option<PathBuf>,

    #[arg(long = "config", value_name = "FILE", env = "STREAMGUARD_CONFIG", help = "Rule table (YAML) layered over the built-in rules.")]
    pub config: Option<PathBuf>,

    #[arg(long = "engine", value_enum, default_value_t = EngineChoice::Regex, help = "Detection backend.")]
    pub engine: EngineChoice,

    /// Rules marked `opt_in: true` in a rule table stay off until named here.
    #[arg(long, short = 'e', value_delimiter = ',', help = "Turn on opt-in rules by name (comma-separated).")]
    pub enable: Vec<String>,

    #[arg(long, short = 'x', value_delimiter = ',', help = "Turn off rules by name (comma-separated). Wins over --enable.")]
    pub disable: Vec<String>,
}

/// Arguments for `streamguard redact`.
#[derive(Parser, Debug)]
pub struct RedactCommand {
    #[command(flatten)]
    pub rules: RuleArgs,

    #[arg(long, short = 'o', value_name = "FILE", help = "Write redacted text to FILE. Standard output is used when omitted.")]
    pub output: Option<PathBuf>,

    #[arg(long = "buffer-size", value_name = "N", env = "STREAMGUARD_BUFFER_SIZE", help = "Buffered characters above which a flush is attempted.")]
    pub buffer_size: Option<usize>,

    #[arg(long = "safety-margin", value_name = "N", env = "STREAMGUARD_SAFETY_MARGIN", help = "Trailing characters always held back on a flush.")]
    pub safety_margin: Option<usize>,

    #[arg(long = "boundary-window", value_name = "N", help = "How many characters before the safety margin are searched for a boundary.")]
    pub boundary_window: Option<usize>,

    #[arg(long = "no-partial-check", help = "Cut on any boundary without checking for a partial match before it.")]
    pub no_partial_check: bool,

    #[arg(long = "unsafe-cut", value_enum, value_name = "POLICY", help = "What to do when no boundary in the window is safe.")]
    pub unsafe_cut: Option<UnsafeCutChoice>,

    /// Simulates a token stream from a file or pipe.
    #[arg(long = "fragment-size", value_name = "N", conflicts_with = "line_buffered", help = "Feed the input to the session in fragments of N characters.")]
    pub fragment_size: Option<usize>,

    #[arg(long = "line-buffered", help = "Feed the input to the session one line at a time.")]
    pub line_buffered: bool,

    #[arg(long = "no-redaction-summary", help = "Skip the per-rule summary and session statistics on stderr.")]
    pub no_summary: bool,
}

/// Arguments for `streamguard scan`.
#[derive(Parser, Debug)]
pub struct ScanCommand {
    #[command(flatten)]
    pub rules: RuleArgs,

    /// Lets CI jobs gate on leaked values.
    #[arg(long = "fail-over-threshold", value_name = "N", help = "Exit with status 1 when more than N values are detected.")]
    pub fail_over_threshold: Option<usize>,

    #[arg(long = "json-stdout", help = "Print the report to stdout as JSON instead of a table.")]
    pub json_stdout: bool,
}
