use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::report::{OutputFormat, render};
use crate::{Reconstruction, RestoreError, RestoreResult, reconstruct_file};

/// Output path for `input`: `<stem><suffix>` in the same directory.
pub fn output_path(input: &Path, format: OutputFormat) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "session".to_string());
    input.with_file_name(format!("{stem}{}", format.suffix()))
}

/// Reconstruct `input` and write the rendered document to `output`.
pub fn restore_to(input: &Path, output: &Path, format: OutputFormat) -> RestoreResult<Reconstruction> {
    let reconstruction = reconstruct_file(input)?;
    let document = render(&reconstruction, format);

    if let Some(dir) = output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir)
            .map_err(|e| RestoreError::Message(format!("failed to create {}: {e}", dir.display())))?;
    }
    std::fs::write(output, document)
        .map_err(|e| RestoreError::Message(format!("failed to write {}: {e}", output.display())))?;

    if reconstruction.skipped() > 0 {
        warn!(
            input = %input.display(),
            skipped = reconstruction.skipped(),
            "some lines could not be parsed"
        );
    }
    info!(
        input = %input.display(),
        output = %output.display(),
        messages = reconstruction.messages.len(),
        "restored session"
    );
    Ok(reconstruction)
}

/// Restore a single session file and print a preview of the result.
pub fn run(input: &Path, format: OutputFormat, preview_lines: usize) -> RestoreResult<PathBuf> {
    if !input.is_file() {
        return Err(RestoreError::NotFound(input.to_path_buf()));
    }

    let output = output_path(input, format);
    let reconstruction = restore_to(input, &output, format)?;

    println!("✅ Restored {} messages", reconstruction.messages.len());
    println!("📄 Output: {}", output.display());

    if preview_lines > 0 {
        let document = std::fs::read_to_string(&output)?;
        println!("\n{}", preview(&document, preview_lines));
    }
    Ok(output)
}

/// First `lines` lines of `document`, with a marker when more follow.
pub fn preview(document: &str, lines: usize) -> String {
    let total = document.lines().count();
    let mut out = document.lines().take(lines).collect::<Vec<_>>().join("\n");
    if total > lines {
        out.push_str(&format!("\n... ({} more lines)", total - lines));
    }
    out
}
