//! The host build tool as seen from duplex: a plugin interface, a build API,
//! and the draft configuration passed between them.

mod config;
mod pipeline;
mod plugin;

pub use config::{BuildSection, EntryInput, InlineConfig, SsrOptions};
pub use pipeline::PluginPipeline;
pub use plugin::{
    Apply, Command, ConfigEnv, Enforce, HostBuild, HostContext, HostPlugin, SharedHostPlugin,
};
