// streamguard-core/src/stream/pipeline.rs
//! Drives a `StreamSession` from a channel of fragments.
//!
//! The generator side sends fragments on an `mpsc` channel and closes it at
//! end of stream. Safe output is forwarded as soon as the session releases
//! it. A redaction failure ends the pipeline with that error; nothing after
//! the failure is emitted.

use log::{debug, warn};
use tokio::sync::mpsc;

use crate::errors::Result;
use crate::stream::session::StreamSession;

/// Feeds every fragment from `fragments` through `session`, sends non-empty
/// output to `output`, and finalizes when the input channel closes.
///
/// Returns the finished session so the caller can read its statistics and
/// summary. If the output receiver goes away the pipeline stops early and
/// returns the session unfinalized.
pub async fn run_pipeline(
    mut session: StreamSession,
    mut fragments: mpsc::Receiver<String>,
    output: mpsc::Sender<String>,
) -> Result<StreamSession> {
    while let Some(fragment) = fragments.recv().await {
        let safe = session.process_chunk(&fragment)?;
        if safe.is_empty() {
            continue;
        }
        if output.send(safe).await.is_err() {
            warn!("Output receiver dropped; stopping stream pipeline.");
            return Ok(session);
        }
    }

    debug!("Fragment channel closed; finalizing session.");
    let tail = session.finalize()?;
    if !tail.is_empty() && output.send(tail).await.is_err() {
        warn!("Output receiver dropped before the final flush was delivered.");
    }
    Ok(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RuleTable, SessionConfig};
    use crate::engines::EngineKind;
    use crate::redactor::Redactor;
    use crate::sanitizers::compiler::compile_partials;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_pipeline_redacts_split_ssn() {
        let table = RuleTable::load_default_rules().unwrap();
        let session = StreamSession::new(
            Redactor::from_rule_table(&table, EngineKind::Regex).unwrap(),
            Arc::new(compile_partials(&table.partials).unwrap()),
            SessionConfig { buffer_size: 10, safety_margin: 5, ..Default::default() },
        )
        .unwrap();

        let (frag_tx, frag_rx) = mpsc::channel(8);
        let (out_tx, mut out_rx) = mpsc::channel(8);
        let handle = tokio::spawn(run_pipeline(session, frag_rx, out_tx));

        for fragment in ["My SSN is 234-", "56-7890 today"] {
            frag_tx.send(fragment.to_string()).await.unwrap();
        }
        drop(frag_tx);

        let mut out = String::new();
        while let Some(piece) = out_rx.recv().await {
            out.push_str(&piece);
        }
        let session = handle.await.unwrap().unwrap();

        assert_eq!(out, "My SSN is [REDACTED-SSN] today");
        assert!(session.is_finished());
        assert_eq!(session.summary()[0].rule_name, "ssn");
    }
}
