//! Engine module: turns a raw event log into renderable logical messages.
//!
//! # Pipeline
//!
//! - **Reader** (`crate::storage`): one pass over the log, producing events
//!   and filling the `CorrelationIndex` with capability results as it goes.
//! - **Aggregator** (`aggregate`): folds events sharing an identity into one
//!   `LogicalMessage` and orders the messages by timestamp.
//! - **Renderers** (`crate::report`): pure functions of a `Reconstruction`.
//!
//! All state lives in the `Reconstruction` built for one log, so separate logs
//! can be processed independently.

pub mod aggregate;
pub mod correlation;
pub mod stats;

use std::io::BufRead;
use std::path::Path;

use tracing::debug;

use crate::RestoreResult;
use crate::core::message::LogicalMessage;
use crate::storage::{LineDiagnostic, ReadOutcome, read_events, read_events_from_path};

// Re-export key types for convenience
pub use aggregate::aggregate;
pub use correlation::{CapabilityResult, CorrelationIndex};
pub use stats::SessionStats;

/// The reconstructed session: messages plus the index needed to render results.
#[derive(Debug)]
pub struct Reconstruction {
    pub messages: Vec<LogicalMessage>,
    pub correlation: CorrelationIndex,
    pub diagnostics: Vec<LineDiagnostic>,
    pub stats: SessionStats,
}

impl Reconstruction {
    pub fn from_outcome(mut outcome: ReadOutcome) -> Self {
        let mut stats = SessionStats::from_records(&outcome);
        let messages = aggregate(std::mem::take(&mut outcome.events));
        stats.add_usage(&messages);

        debug!(
            messages = messages.len(),
            results = outcome.correlation.len(),
            skipped = outcome.skipped(),
            "reconstruction complete"
        );

        Reconstruction {
            messages,
            correlation: outcome.correlation,
            diagnostics: outcome.diagnostics,
            stats,
        }
    }

    pub fn skipped(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Reconstruct a session from any buffered reader.
pub fn reconstruct<R: BufRead>(reader: R) -> Reconstruction {
    Reconstruction::from_outcome(read_events(reader))
}

/// Reconstruct a session from an event log file.
pub fn reconstruct_file(path: &Path) -> RestoreResult<Reconstruction> {
    let outcome = read_events_from_path(path)?;
    Ok(Reconstruction::from_outcome(outcome))
}
