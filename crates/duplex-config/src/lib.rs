//! # duplex-config
//!
//! Configuration for a paired server/client build: the partial options a user
//! writes, the opinionated defaults for both targets, and the resolver that
//! deep-merges one over the other and validates the result.
//!
//! ```
//! use duplex_config::{BuildMode, PartialClientConfig, UserOptions, resolve};
//!
//! let options = UserOptions {
//!     mode: Some(BuildMode::ServerFirst),
//!     client_config: Some(PartialClientConfig {
//!         out_dir: Some("dist/spa".into()),
//!         ..Default::default()
//!     }),
//!     ..UserOptions::new("server/main.js")
//! };
//!
//! let config = resolve(&options).unwrap();
//! assert_eq!(config.client_config.out_dir.to_str(), Some("dist/spa"));
//! assert!(config.client_config.minify.is_enabled()); // default kept
//! ```

pub mod config;
pub mod discovery;
pub mod error;
pub mod options;
pub mod resolve;
pub mod validation;

pub use config::*;
pub use discovery::ConfigDiscovery;
pub use error::{ConfigError, Result};
pub use options::{PartialClientConfig, PartialOutputNaming, PartialServerConfig, UserOptions};
pub use resolve::{merge_values, resolve, resolve_value};
pub use validation::validate;
