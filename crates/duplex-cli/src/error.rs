//! Error handling for the duplex CLI.
//!
//! Library errors convert into [`CliError`] through `#[from]`;
//! [`cli_error_to_miette`] turns the result into a report with a hint for
//! the user where one applies.

use std::path::PathBuf;

use duplex_config::ConfigError;
use miette::Report;
use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    /// Loading, merging or validating the configuration failed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A server, client or project build failed
    #[error("Build failed: {0:#}")]
    Build(anyhow::Error),

    /// The given project root does not exist
    #[error("Project root not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Render a [`CliError`] as a miette report.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Config(ConfigError::NotFound(root)) => miette::miette!(
            help = "Create a duplex.toml with at least `server_entry`, or pass --server-entry",
            "No duplex config found in {}",
            root.display()
        ),
        CliError::Config(ConfigError::MissingField { field }) => miette::miette!(
            help = format!("Set `{field}` in duplex.toml or on the command line"),
            "Missing required config field `{field}`"
        ),
        CliError::Config(e @ ConfigError::OverlappingOutputDirs { .. }) => miette::miette!(
            help = "Give the client build an out_dir outside the server's, or use server-first mode",
            "{e}"
        ),
        CliError::RootNotFound(root) => miette::miette!(
            help = "Pass an existing directory to --root",
            "Project root not found: {}",
            root.display()
        ),
        other => miette::miette!("{other}"),
    }
}
