//! Command implementations.
//!
//! - [`build`] - run the server and client builds
//! - [`check`] - resolve the configuration without building

pub mod build;
pub mod check;
mod config;

pub use build::execute as build_execute;
pub use check::execute as check_execute;
pub use config::load_config;
