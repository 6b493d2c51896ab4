use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::{debug, error, info};

use crate::config::BatchConfig;
use crate::report::OutputFormat;
use crate::restore_cmd::restore_to;
use crate::{RestoreError, RestoreResult};

/// Per-file outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub succeeded: Vec<PathBuf>,
    /// Failed inputs with the error that stopped them.
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Session logs in `dir` that the batch should process, sorted by file name.
///
/// A file is selected when its extension is accepted, its name does not start
/// with the exclusion prefix, and it is not empty.
pub fn select_inputs(dir: &Path, config: &BatchConfig) -> RestoreResult<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        // Follows symlinks; a dangling link is skipped.
        let meta = match std::fs::metadata(&path) {
            Ok(meta) => meta,
            Err(e) => {
                debug!(path = %path.display(), "skipping unreadable entry: {e}");
                continue;
            }
        };
        if !meta.is_file() || meta.len() == 0 {
            continue;
        }

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !config.exclude_prefix.is_empty() && name.starts_with(&config.exclude_prefix) {
            continue;
        }
        let accepted = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| config.extensions.iter().any(|a| a.eq_ignore_ascii_case(ext)));
        if accepted {
            inputs.push(path);
        }
    }
    inputs.sort();
    Ok(inputs)
}

/// Restore every selected log in `dir` into `<dir>/<output_subdir>/`.
///
/// A failure on one file is recorded and the batch moves on.
pub fn run(dir: &Path, format: OutputFormat, config: &BatchConfig) -> RestoreResult<BatchSummary> {
    if !dir.is_dir() {
        return Err(RestoreError::NotFound(dir.to_path_buf()));
    }

    let inputs = select_inputs(dir, config)?;
    let out_dir = dir.join(&config.output_subdir);
    std::fs::create_dir_all(&out_dir).map_err(|e| {
        RestoreError::Message(format!("failed to create {}: {e}", out_dir.display()))
    })?;
    info!(files = inputs.len(), output = %out_dir.display(), "batch restore");

    let mut summary = BatchSummary::default();
    for input in inputs {
        match restore_one(&input, &out_dir, format) {
            Ok(output) => {
                println!("✅ {} -> {}", input.display(), output.display());
                summary.succeeded.push(input);
            }
            Err(e) => {
                error!(input = %input.display(), "{e:#}");
                println!("❌ {}: {e:#}", input.display());
                summary.failed.push((input, format!("{e:#}")));
            }
        }
    }
    Ok(summary)
}

fn restore_one(input: &Path, out_dir: &Path, format: OutputFormat) -> anyhow::Result<PathBuf> {
    let name = input
        .file_name()
        .with_context(|| format!("no file name in {}", input.display()))?;
    let output = crate::restore_cmd::output_path(&out_dir.join(name), format);
    restore_to(input, &output, format)
        .with_context(|| format!("failed to restore {}", input.display()))?;
    Ok(output)
}
