use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{RestoreError, RestoreResult};

/// Settings loaded from an optional TOML file. Missing keys use defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RestoreConfig {
    /// Input used when no positional argument is given.
    pub default_input: PathBuf,
    /// Number of output lines echoed to stdout after a single-file restore.
    pub preview_lines: usize,
    pub batch: BatchConfig,
}

impl Default for RestoreConfig {
    fn default() -> Self {
        RestoreConfig {
            default_input: PathBuf::from("case.jsonl"),
            preview_lines: 50,
            batch: BatchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Accepted file extensions, without the leading dot.
    pub extensions: Vec<String>,
    /// Files whose name starts with this prefix are skipped (sub-agent logs).
    pub exclude_prefix: String,
    /// Subdirectory of the input directory that receives the outputs.
    pub output_subdir: String,
}

impl Default for BatchConfig {
    fn default() -> Self {
        BatchConfig {
            extensions: vec!["jsonl".to_string()],
            exclude_prefix: "agent-".to_string(),
            output_subdir: "restored".to_string(),
        }
    }
}

/// Load settings from `path`, or return defaults when no path is given.
pub fn load_config(path: Option<&Path>) -> RestoreResult<RestoreConfig> {
    let Some(path) = path else {
        return Ok(RestoreConfig::default());
    };
    let s = std::fs::read_to_string(path)
        .map_err(|e| RestoreError::Config(format!("{}: {e}", path.display())))?;
    parse_config(&s).map_err(|e| match e {
        RestoreError::Config(msg) => RestoreError::Config(format!("{}: {msg}", path.display())),
        other => other,
    })
}

pub fn parse_config(s: &str) -> RestoreResult<RestoreConfig> {
    let cfg: RestoreConfig = toml::from_str(s).map_err(|e| RestoreError::Config(e.to_string()))?;
    if cfg.batch.output_subdir.trim().is_empty() {
        return Err(RestoreError::Config(
            "batch.output_subdir must not be empty".to_string(),
        ));
    }
    Ok(cfg)
}
