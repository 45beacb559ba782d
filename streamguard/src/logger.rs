// streamguard/src/logger.rs
//! Process-wide `env_logger` setup.
//!
//! `RUST_LOG` is honoured unless a level is forced by `--quiet` or `--debug`.
//! Log output goes to stderr so it never mixes with redacted output.

use log::LevelFilter;
use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes logging once. Later calls are ignored.
///
/// `Some(level)` overrides whatever `RUST_LOG` asks for; `None` falls back to
/// `RUST_LOG`, defaulting to `warn`.
pub fn init_logger(level: Option<LevelFilter>) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
        if let Some(level) = level {
            builder.filter_level(level);
        }
        builder.format_timestamp(None).target(env_logger::Target::Stderr);
        // A logger may already be installed by a test harness.
        builder.try_init().ok();
    });
}

/// Chooses the forced level for the given global flags.
pub fn level_for_flags(quiet: bool, debug: bool) -> Option<LevelFilter> {
    if quiet {
        Some(LevelFilter::Off)
    } else if debug {
        Some(LevelFilter::Debug)
    } else {
        None
    }
}
