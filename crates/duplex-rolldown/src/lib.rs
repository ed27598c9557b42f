//! # duplex-rolldown
//!
//! A host for duplex builds that bundles with Rolldown.
//!
//! ```no_run
//! use duplex_core::host::HostBuild;
//! use duplex_core::{BuilderOptions, builder};
//! use duplex_rolldown::{RolldownHost, top_level_config};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let plugins = builder(BuilderOptions::new("server/main.js"))?;
//! let host = RolldownHost::new("./my-app", plugins);
//! host.build(top_level_config()).await?;
//! # Ok(())
//! # }
//! ```
//!
//! The outer build's own configuration is what the project would build
//! without duplex: the `index.html` page written to `dist`. The duplex
//! plugins divert it and start the server and client builds instead.

pub mod error;
pub mod html;
pub mod host;
pub mod options;
pub mod plugins;
pub mod writer;

use duplex_core::host::{EntryInput, InlineConfig};

pub use error::{HostError, Result};
pub use host::{BuildSummary, RolldownHost};
pub use options::{ExternalPolicy, bundler_options};

/// The configuration of a plain project build: `index.html` into `dist`.
pub fn top_level_config() -> InlineConfig {
    let mut config = InlineConfig::default();
    config.build.input = vec![EntryInput::new("main", "index.html")];
    config.public_dir = Some("public".into());
    config
}
