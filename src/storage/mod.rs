//! Storage layer: reading session event logs.

pub mod jsonl;

// Re-export key types
pub use jsonl::{LineDiagnostic, ReadOutcome, read_events, read_events_from_path};
