//! Command-line interface definition.
//!
//! - `duplex build` - run the server and client builds
//! - `duplex check` - resolve the configuration and print it

mod commands;
pub mod enums;

use clap::Parser;

pub use commands::{BuildArgs, CheckArgs, Command, ConfigArgs};
pub use enums::Mode;

/// Duplex - server and client bundles from one build
#[derive(Parser, Debug)]
#[command(
    name = "duplex",
    version,
    about = "Server and client bundles from one build",
    long_about = "Duplex runs a server build and a client build of the same project\n\
                  from a single invocation, in the order you choose."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}
