// streamguard-entity/src/lib.rs
//! Statistical entity recognition for StreamGuard.
//!
//! A `no_std` engine that finds personal identifiers (SSNs, card numbers,
//! bank numbers, dates, money amounts, street locations, licence-like IDs)
//! in a byte slice without any fixed regex table. Candidates are scored
//! from their shape, checksum validity, Shannon entropy and the keywords
//! that precede them.
#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod kind;
pub mod entropy;
pub mod validators;
pub mod scanner;
pub mod context;
pub mod scoring;
pub mod engine;

pub use kind::EntityKind;
pub use engine::{EntityEngine, EntityMatch};

/// Score in `0.0..=1.0` attached to every reported entity.
pub type Confidence = f64;
