// streamguard/src/ui/theme.rs
//! Colors for the messages streamguard writes to stderr.
//!
//! A theme maps each kind of message to an optional 16-color ANSI
//! foreground. Users can override any entry from a YAML file; entries the
//! file leaves out keep their defaults.

use anyhow::{Context, Result};
use owo_colors::AnsiColors;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Style per message kind. A complete map has an entry for every [`ThemeEntry`].
pub type ThemeMap = HashMap<ThemeEntry, ThemeStyle>;

/// Kinds of output that carry their own color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeEntry {
    /// Section titles such as the summary header.
    Header,
    Success,
    Info,
    Warn,
    Error,
    /// The name of a rule in summary output.
    SummaryRuleName,
    /// The number of occurrences in summary output.
    SummaryOccurrences,
}

impl ThemeEntry {
    pub const ALL: [ThemeEntry; 7] = [
        ThemeEntry::Header,
        ThemeEntry::Success,
        ThemeEntry::Info,
        ThemeEntry::Warn,
        ThemeEntry::Error,
        ThemeEntry::SummaryRuleName,
        ThemeEntry::SummaryOccurrences,
    ];
}

/// The 16 foreground colors a theme file may name.
const NAMED_COLORS: [(&str, AnsiColors); 16] = [
    ("black", AnsiColors::Black),
    ("red", AnsiColors::Red),
    ("green", AnsiColors::Green),
    ("yellow", AnsiColors::Yellow),
    ("blue", AnsiColors::Blue),
    ("magenta", AnsiColors::Magenta),
    ("cyan", AnsiColors::Cyan),
    ("white", AnsiColors::White),
    ("brightblack", AnsiColors::BrightBlack),
    ("brightred", AnsiColors::BrightRed),
    ("brightgreen", AnsiColors::BrightGreen),
    ("brightyellow", AnsiColors::BrightYellow),
    ("brightblue", AnsiColors::BrightBlue),
    ("brightmagenta", AnsiColors::BrightMagenta),
    ("brightcyan", AnsiColors::BrightCyan),
    ("brightwhite", AnsiColors::BrightWhite),
];

/// One of [`NAMED_COLORS`], spelled in lowercase in theme files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub struct ThemeColor(&'static str);

// Equivalent to `#[serde(try_from = "String")]`; written by hand because the
// derive would tie the `&'static str` field to the deserializer lifetime.
impl<'de> Deserialize<'de> for ThemeColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        ThemeColor::try_from(value).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone)]
pub struct ParseThemeColorError(String);

impl fmt::Display for ParseThemeColorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<&str> = NAMED_COLORS.iter().map(|(name, _)| *name).collect();
        write!(f, "Unknown theme color '{}'; choose from {}", self.0, names.join(", "))
    }
}

impl std::error::Error for ParseThemeColorError {}

impl FromStr for ThemeColor {
    type Err = ParseThemeColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NAMED_COLORS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(name, _)| ThemeColor(*name))
            .ok_or_else(|| ParseThemeColorError(s.to_string()))
    }
}

impl TryFrom<String> for ThemeColor {
    type Error = ParseThemeColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ThemeColor> for String {
    fn from(color: ThemeColor) -> Self {
        color.0.to_string()
    }
}

impl ThemeColor {
    pub fn name(&self) -> &'static str {
        self.0
    }

    pub fn to_ansi_color(&self) -> AnsiColors {
        NAMED_COLORS
            .iter()
            .find(|(name, _)| *name == self.0)
            .map_or(AnsiColors::White, |(_, ansi)| *ansi)
    }
}

/// How one kind of output is drawn. `fg: None` leaves the terminal default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ThemeStyle {
    pub fg: Option<ThemeColor>,
}

/// Loads a theme from a YAML file, or returns the default theme.
pub fn build_theme_map(theme_path: Option<&Path>) -> Result<ThemeMap> {
    match theme_path {
        Some(path) => ThemeStyle::load_from_file(path),
        None => Ok(ThemeStyle::default_theme_map()),
    }
}

impl ThemeStyle {
    /// Loads a theme file and fills in defaults for entries it does not set.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<ThemeMap> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read theme file {}", path.display()))?;
        let mut custom: ThemeMap = serde_yml::from_str(&text)
            .with_context(|| format!("Failed to parse theme file {}", path.display()))?;

        for (entry, style) in Self::default_theme_map() {
            custom.entry(entry).or_insert(style);
        }
        Ok(custom)
    }

    /// Returns the default theme.
    pub fn default_theme_map() -> ThemeMap {
        let color = |name: &'static str| ThemeStyle { fg: Some(ThemeColor(name)) };
        ThemeEntry::ALL
            .into_iter()
            .map(|entry| {
                let style = match entry {
                    ThemeEntry::Header => color("cyan"),
                    ThemeEntry::Success => color("green"),
                    ThemeEntry::Warn => color("yellow"),
                    ThemeEntry::Error => color("red"),
                    ThemeEntry::SummaryRuleName => color("brightmagenta"),
                    ThemeEntry::SummaryOccurrences => color("brightyellow"),
                    ThemeEntry::Info => color("white"),
                };
                (entry, style)
            })
            .collect()
    }
}
