// streamguard/src/ui/output_format.rs
//! Themed status messages for stderr.

use owo_colors::OwoColorize;
use std::io::{self, Write};

use super::theme::{ThemeEntry, ThemeMap};

/// Writes `text` in the theme's color for `entry`, or plain when color is off.
pub fn write_styled<W: Write + ?Sized>(
    writer: &mut W,
    text: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    let color = theme.get(&entry).and_then(|style| style.fg.as_ref());
    match color {
        Some(color) if supports_color => write!(writer, "{}", text.color(color.to_ansi_color())),
        _ => write!(writer, "{}", text),
    }
}

fn print_message<W: Write + ?Sized>(
    writer: &mut W,
    prefix: &str,
    msg: &str,
    entry: ThemeEntry,
    theme: &ThemeMap,
    supports_color: bool,
) -> io::Result<()> {
    write_styled(writer, &format!("{}{}", prefix, msg), entry, theme, supports_color)?;
    writeln!(writer)
}

pub fn print_info_message<W: Write + ?Sized>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_message(writer, "", msg, ThemeEntry::Info, theme, supports_color)
}

pub fn print_success_message<W: Write + ?Sized>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_message(writer, "", msg, ThemeEntry::Success, theme, supports_color)
}

pub fn print_warn_message<W: Write + ?Sized>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_message(writer, "Warning: ", msg, ThemeEntry::Warn, theme, supports_color)
}

pub fn print_error_message<W: Write + ?Sized>(writer: &mut W, msg: &str, theme: &ThemeMap, supports_color: bool) -> io::Result<()> {
    print_message(writer, "Error: ", msg, ThemeEntry::Error, theme, supports_color)
}
