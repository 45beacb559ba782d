// streamguard/src/commands/mod.rs
//! Command implementations and the helpers they share.

pub mod redact;
pub mod scan;

use anyhow::{Context, Result};
use is_terminal::IsTerminal;
use log::debug;
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use streamguard_core::config::{merge_rules, RuleTable};

use crate::ui::output_format;
use crate::ui::theme::ThemeMap;

type Printer = fn(&mut io::Stderr, &str, &ThemeMap, bool) -> io::Result<()>;

/// Status lines go to stderr so stdout carries only redacted text. A failed
/// write to stderr is ignored.
fn to_stderr(print: Printer, msg: &str, theme: &ThemeMap) {
    let mut stderr = io::stderr();
    let color = stderr.is_terminal();
    let _ = print(&mut stderr, msg, theme, color);
}

pub fn info_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    to_stderr(output_format::print_info_message, msg.as_ref(), theme);
}

pub fn success_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    to_stderr(output_format::print_success_message, msg.as_ref(), theme);
}

/// Prefixed with `Warning: `.
pub fn warn_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    to_stderr(output_format::print_warn_message, msg.as_ref(), theme);
}

/// Prefixed with `Error: `.
pub fn error_msg(msg: impl AsRef<str>, theme: &ThemeMap) {
    to_stderr(output_format::print_error_message, msg.as_ref(), theme);
}

/// Loads the default rule table, merges the user's file over it and applies
/// the enable/disable lists.
pub fn load_rule_table(config: Option<&Path>, enable: &[String], disable: &[String]) -> Result<RuleTable> {
    let defaults = RuleTable::load_default_rules()?;
    let user = config
        .map(|path| RuleTable::load_from_file(path).with_context(|| format!("Failed to load rule table {}", path.display())))
        .transpose()?;
    let mut table = merge_rules(defaults, user);
    table.set_active_rules(enable, disable);
    debug!(
        "Rule table ready: {} of {} rules active, {} partial patterns.",
        table.active_rules().count(),
        table.rules.len(),
        table.partials.len()
    );
    Ok(table)
}

/// Opens the input file, or stdin when no path is given.
pub fn open_input(path: Option<&Path>) -> Result<Box<dyn Read + Send>> {
    match path {
        Some(path) => {
            let file = fs::File::open(path).with_context(|| format!("Failed to open input file {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(io::stdin())),
    }
}
