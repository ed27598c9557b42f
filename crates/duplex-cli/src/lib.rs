//! Duplex CLI - server and client bundles from one build.
//!
//! - [`cli`] - clap argument definitions
//! - [`commands`] - `build` and `check`
//! - [`error`] - CLI errors and their miette rendering
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - colored status lines
//!
//! Configuration is layered the same way for every command: the project's
//! `duplex.toml` (or the `duplex` field of `package.json`), then `DUPLEX_*`
//! environment variables, then command-line flags.

pub mod cli;
pub mod commands;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};
