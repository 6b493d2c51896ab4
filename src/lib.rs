pub mod batch_cmd;
pub mod config;
pub mod core;
pub mod engine;
pub mod report;
pub mod restore_cmd;
pub mod stats_cmd;
pub mod storage;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error("input not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("invalid config: {0}")]
    Config(String),
    #[error("{0}")]
    Message(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

pub type RestoreResult<T> = Result<T, RestoreError>;

pub use engine::{Reconstruction, reconstruct, reconstruct_file};
pub use report::{OutputFormat, render};
