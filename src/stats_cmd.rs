use std::path::Path;

use crate::engine::SessionStats;
use crate::{RestoreError, RestoreResult, reconstruct_file};

/// Compute the summary counters for one session file.
pub fn collect(input: &Path) -> RestoreResult<SessionStats> {
    if !input.is_file() {
        return Err(RestoreError::NotFound(input.to_path_buf()));
    }
    Ok(reconstruct_file(input)?.stats)
}

/// Print the session summary, boxed text or pretty JSON.
pub fn run(input: &Path, json: bool) -> RestoreResult<()> {
    let stats = collect(input)?;
    if json {
        let out = serde_json::to_string_pretty(&stats)
            .map_err(|e| RestoreError::Message(e.to_string()))?;
        println!("{out}");
    } else {
        print!("{}", stats.render_text(&input.display().to_string()));
    }
    Ok(())
}
