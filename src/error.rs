use std::path::PathBuf;

use arrow::error::ArrowError;
use thiserror::Error;

/// Fatal conditions of a cleaning run. Every variant aborts the run.
#[derive(Error, Debug)]
pub enum CleanError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed code line {line:?} in block {block}: {reason}")]
    Parse {
        block: usize,
        line: String,
        reason: String,
    },

    #[error("schema error: {0}")]
    Schema(String),

    #[error("table error: {0}")]
    Table(#[from] ArrowError),
}

impl CleanError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
