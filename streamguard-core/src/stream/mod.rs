// streamguard-core/src/stream/mod.rs
//! Streaming redaction: the per-stream buffer manager and an async driver
//! for fragment channels.

pub mod pipeline;
pub mod session;

pub use pipeline::run_pipeline;
pub use session::{SessionStats, StreamSession};
