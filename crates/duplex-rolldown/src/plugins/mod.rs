//! Rolldown plugins installed on every host build.

mod bridge;
mod define;

pub use bridge::HostPluginBridge;
pub use define::{DefinePlugin, replace_defines};
