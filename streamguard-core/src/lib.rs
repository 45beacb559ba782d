// streamguard-core/src/lib.rs
//! # StreamGuard Core Library
//!
//! `streamguard-core` redacts sensitive data from text that arrives in
//! fragments, such as the token stream of a generative model. It guarantees
//! that no unredacted match is ever released, even when a sensitive value
//! is split across fragments, while releasing text as early as it safely can.
//!
//! ## Modules
//!
//! * `config`: `PatternRule`s, `PartialPattern`s, the `RuleTable` and the per-session `SessionConfig`.
//! * `sanitizers`: Compiles rule tables into `CompiledRules` and `CompiledPartials`.
//! * `engine`: Defines the `SanitizationEngine` trait, enabling a modular design.
//! * `engines`: Concrete engines (regex, statistical entity, composite) and `build_engine`.
//! * `redactor`: The stateless span redactor shared by sessions.
//! * `stream`: The per-stream buffer manager (`StreamSession`) and the async `run_pipeline`.
//! * `redaction_match`: Match and summary types, PII-safe debug logging.
//! * `headless`: One-shot convenience wrappers.
//! * `errors`: The `StreamGuardError` enum.
//!
//! ## Usage Example
//!
//! ```rust
//! use streamguard_core::{EngineKind, RuleTable, StreamSession};
//!
//! fn main() -> anyhow::Result<()> {
//!     let table = RuleTable::load_default_rules()?;
//!     let mut session = StreamSession::from_rule_table(&table, EngineKind::Regex)?;
//!
//!     let mut out = String::new();
//!     for fragment in ["My SSN is 234-", "56-7890 today"] {
//!         out.push_str(&session.process_chunk(fragment)?);
//!     }
//!     out.push_str(&session.finalize()?);
//!
//!     assert_eq!(out, "My SSN is [REDACTED-SSN] today");
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library operations return [`StreamGuardError`]. Loading configuration from
//! disk returns `anyhow::Result` with file context. A failing engine is always
//! an error; text is never passed through unredacted in its place.
//!
//! ---
//! License: MIT OR APACHE 2.0

pub mod config;
pub mod engine;
pub mod engines;
pub mod errors;
pub mod headless;
pub mod redaction_match;
pub mod redactor;
pub mod sanitizers;
pub mod stream;

/// Re-exports the public configuration types and functions for managing rule tables.
pub use config::{
    merge_rules,
    validate_partials,
    validate_rules,
    EngineConfig,
    EntityConfig,
    PartialPattern,
    PatternRule,
    RuleTable,
    SessionConfig,
    StreamConfig,
    UnsafeCutPolicy,
    DEFAULT_BOUNDARY_CHARS,
    MAX_PATTERN_LENGTH,
};

/// Re-exports the custom error type for clear error reporting.
pub use errors::StreamGuardError;

/// Re-exports the engine contract and its implementations.
pub use engine::{SanitizationEngine, Sanitized};
pub use engines::{build_engine, EngineKind};
pub use engines::composite_engine::CompositeEngine;
pub use engines::entity_engine::EntityEngine;
pub use engines::regex_engine::RegexEngine;

pub use redactor::Redactor;
pub use stream::{run_pipeline, SessionStats, StreamSession};

/// Re-exports types for redaction matches and summaries.
pub use redaction_match::{redact_sensitive, RedactionMatch, RedactionSummaryItem};

/// Re-exports types and functions for one-shot, non-interactive use.
pub use headless::{headless_redact_fragments, headless_redact_string, headless_scan};

pub use sanitizers::compiler::{
    compile_partials,
    compile_rules,
    partials_for_engine,
    CompiledPartials,
    CompiledRules,
};
