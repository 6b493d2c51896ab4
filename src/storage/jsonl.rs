//! JSONL (JSON Lines) event log reader.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::core::schema::{ContentBlock, RawEvent};
use crate::engine::correlation::CorrelationIndex;
use crate::{RestoreError, RestoreResult};

/// A line that could not be turned into an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineDiagnostic {
    /// 1-based line number.
    pub line: usize,
    pub message: String,
}

/// Everything produced by a single pass over an event log.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    /// Participant and assistant events, in read order.
    pub events: Vec<RawEvent>,
    /// Results registered while reading participant turns.
    pub correlation: CorrelationIndex,
    pub diagnostics: Vec<LineDiagnostic>,
    /// Non-blank lines seen, parsed or not.
    pub total_lines: usize,
    /// Internal-control and unrecognised records that were parsed and excluded.
    pub control_records: usize,
}

impl ReadOutcome {
    pub fn skipped(&self) -> usize {
        self.diagnostics.len()
    }
}

/// Read an event log from any buffered reader.
///
/// Malformed lines are skipped with a diagnostic; reading never aborts on a
/// bad line. An I/O error from `reader` is recorded and ends the pass.
/// Capability results found in participant turns are registered
/// into the correlation index during this same pass.
pub fn read_events<R: BufRead>(reader: R) -> ReadOutcome {
    let mut outcome = ReadOutcome::default();

    for (line_idx, chunk) in reader.split(b'\n').enumerate() {
        let line_num = line_idx + 1;
        let bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                // The underlying reader failed; nothing after this is reliable.
                record_skip(&mut outcome, line_num, format!("failed to read line: {e}"));
                break;
            }
        };

        let line = match std::str::from_utf8(&bytes) {
            Ok(line) => line.trim_end_matches('\r'),
            Err(e) => {
                record_skip(&mut outcome, line_num, format!("invalid UTF-8: {e}"));
                outcome.total_lines += 1;
                continue;
            }
        };

        // Skip empty lines
        if line.trim().is_empty() {
            continue;
        }
        outcome.total_lines += 1;

        let event: RawEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                record_skip(&mut outcome, line_num, format!("failed to parse record: {e}"));
                continue;
            }
        };

        if !event.is_conversational() {
            outcome.control_records += 1;
            continue;
        }

        if let RawEvent::Participant(record) = &event {
            for block in record.blocks() {
                if let ContentBlock::ToolResult {
                    tool_use_id: Some(id),
                    content,
                } = block
                {
                    let fresh =
                        outcome
                            .correlation
                            .register(id.as_str(), content.to_text(), record.timestamp.clone());
                    if !fresh {
                        debug!(line = line_num, invocation_id = %id, "duplicate result ignored");
                    }
                }
            }
        }

        outcome.events.push(event);
    }

    outcome
}

/// Open and read an event log file.
pub fn read_events_from_path(path: &Path) -> RestoreResult<ReadOutcome> {
    if !path.exists() {
        return Err(RestoreError::NotFound(path.to_path_buf()));
    }

    let file = File::open(path).map_err(|e| {
        RestoreError::Message(format!("failed to open {}: {e}", path.display()))
    })?;

    Ok(read_events(BufReader::new(file)))
}

fn record_skip(outcome: &mut ReadOutcome, line: usize, message: String) {
    warn!(line, "skipping line {line}: {message}");
    outcome.diagnostics.push(LineDiagnostic { line, message });
}
