use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::cli::enums::Mode;

/// Available duplex subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the server and client bundles
    ///
    /// Runs one build of the project with the duplex plugins registered. The
    /// project's own build is replaced by the server and client builds.
    Build(BuildArgs),

    /// Resolve and validate the configuration
    ///
    /// Prints the fully resolved configuration as JSON without building.
    Check(CheckArgs),
}

/// Where the configuration comes from, shared by every command.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Project root directory
    #[arg(long, default_value = ".", value_name = "DIR")]
    pub root: PathBuf,

    /// Config file to load instead of discovering one under the root
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Build order, overriding the config file
    #[arg(short, long, value_enum)]
    pub mode: Option<Mode>,

    /// Server entry module, overriding the config file
    #[arg(long, value_name = "PATH")]
    pub server_entry: Option<String>,
}

/// Arguments for the build command
#[derive(Args, Debug)]
pub struct BuildArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}
