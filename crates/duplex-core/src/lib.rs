//! # duplex-core
//!
//! Server and client bundles from one build of a host bundler.
//!
//! Register the plugins returned by [`builder`] with the host. When the host
//! runs a build, the outer build is diverted to an empty virtual entry and the
//! [`Orchestrator`] starts two nested builds through the host's own build API:
//! one for the server entry and one for the client entries, in the order the
//! [`BuildMode`] asks for.
//!
//! ```no_run
//! use duplex_core::{BuildMode, BuilderOptions, builder};
//!
//! # fn main() -> duplex_core::Result<()> {
//! let plugins = builder(
//!     BuilderOptions::new("server/main.js")
//!         .mode(BuildMode::Parallel)
//!         .client_entry("main", "index.html"),
//! )?;
//! // hand `plugins` to the host's project configuration
//! # let _ = plugins;
//! # Ok(())
//! # }
//! ```
//!
//! The host is anything implementing [`host::HostBuild`]; nested builds must
//! load the same project plugins as the outer one. The [`ReentrancyFlag`]
//! keeps those nested builds from starting the orchestrator again.

pub mod error;
pub mod guard;
pub mod host;
pub mod orchestrator;
pub mod plan;
pub mod plugin;

pub use duplex_config::{BuildMode, ResolvedConfig};
pub use error::{Error, Result, Target};
pub use guard::{
    BuildContext, DiversionPlugin, NESTED_BUILD_ENV, NOOP_ENTRY_ID, ReentrancyFlag,
};
pub use orchestrator::Orchestrator;
pub use plan::{BuildHook, BuildPlan, BuilderOptions};
pub use plugin::{TriggerPlugin, builder, plugins_for};
