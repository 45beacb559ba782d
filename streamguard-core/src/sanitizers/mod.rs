//! Rule compilation for the regex engine and the stream sessions.
//!
//! `compiler` turns a `RuleTable` into `CompiledRules` (the redaction rules,
//! in priority order) and `CompiledPartials` (the end-anchored prefixes used
//! to reject unsafe cut points).

pub mod compiler;
