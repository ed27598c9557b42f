use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, HostError>;

#[derive(Debug, Error)]
pub enum HostError {
    /// Rolldown rejected the options or failed while bundling.
    #[error("bundler error: {0}")]
    Bundler(String),

    #[error("invalid output path: {0}")]
    InvalidOutputPath(String),

    /// The output directory to be emptied is the root itself, above it, or
    /// outside it.
    #[error("refusing to empty {}: not inside the project root {}", .out_dir.display(), .root.display())]
    UnsafeOutDir { out_dir: PathBuf, root: PathBuf },

    #[error("write failed: {0}")]
    WriteFailure(String),

    #[error("cannot read html entry {}: {source}", .path.display())]
    HtmlEntry {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl HostError {
    /// Wrap a Rolldown diagnostic batch.
    pub fn from_rolldown_batch(error: &dyn fmt::Debug) -> Self {
        HostError::Bundler(format!("{error:?}"))
    }
}
