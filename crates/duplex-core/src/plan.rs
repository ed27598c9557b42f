//! The resolved build plan and the options a user writes to obtain it.

use std::fmt;
use std::sync::Arc;

use duplex_config::{
    BuildMode, PartialClientConfig, PartialServerConfig, ResolvedConfig, UserOptions, resolve,
};

use crate::error::Result;
use crate::host::{HostPlugin, InlineConfig, SharedHostPlugin};

/// Last-mile adjustment of one target's host configuration.
pub type BuildHook = Arc<dyn Fn(InlineConfig) -> InlineConfig + Send + Sync>;

fn identity_hook() -> BuildHook {
    Arc::new(|config| config)
}

/// Everything one top-level build needs: the resolved configuration, the
/// per-target hooks, and the per-target plugins.
pub struct BuildPlan {
    pub config: ResolvedConfig,
    pub server_build: BuildHook,
    pub client_build: BuildHook,
    pub server_plugins: Vec<SharedHostPlugin>,
    pub client_plugins: Vec<SharedHostPlugin>,
}

impl BuildPlan {
    /// A plan with identity hooks and no extra plugins.
    pub fn from_config(config: ResolvedConfig) -> Self {
        Self {
            config,
            server_build: identity_hook(),
            client_build: identity_hook(),
            server_plugins: Vec::new(),
            client_plugins: Vec::new(),
        }
    }

    pub fn mode(&self) -> BuildMode {
        self.config.mode
    }
}

impl fmt::Debug for BuildPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuildPlan")
            .field("config", &self.config)
            .field("server_plugins", &self.server_plugins)
            .field("client_plugins", &self.client_plugins)
            .finish_non_exhaustive()
    }
}

/// Builder for a [`BuildPlan`].
///
/// # Example
///
/// ```
/// use duplex_core::{BuildMode, BuilderOptions};
///
/// let plan = BuilderOptions::new("server/main.js")
///     .mode(BuildMode::ServerFirst)
///     .client_entry("main", "index.html")
///     .client_entry("admin", "admin.html")
///     .server_build(|mut config| {
///         config.build.minify = true.into();
///         config
///     })
///     .resolve()
///     .unwrap();
///
/// assert_eq!(plan.config.client_entry.len(), 2);
/// ```
#[derive(Default)]
pub struct BuilderOptions {
    options: UserOptions,
    server_build: Option<BuildHook>,
    client_build: Option<BuildHook>,
    server_plugins: Vec<SharedHostPlugin>,
    client_plugins: Vec<SharedHostPlugin>,
}

impl BuilderOptions {
    pub fn new(server_entry: impl Into<String>) -> Self {
        Self::from_options(UserOptions::new(server_entry))
    }

    pub fn from_options(options: UserOptions) -> Self {
        Self {
            options,
            ..Default::default()
        }
    }

    pub fn mode(mut self, mode: BuildMode) -> Self {
        self.options.mode = Some(mode);
        self
    }

    pub fn server_config(mut self, config: PartialServerConfig) -> Self {
        self.options.server_config = Some(config);
        self
    }

    pub fn client_config(mut self, config: PartialClientConfig) -> Self {
        self.options.client_config = Some(config);
        self
    }

    /// Add a named client entry next to the default `main` entry. Using the
    /// name `main` replaces the default page.
    pub fn client_entry(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.options
            .client_entry
            .get_or_insert_with(Default::default)
            .insert(name.into(), path.into());
        self
    }

    pub fn server_build<F>(mut self, hook: F) -> Self
    where
        F: Fn(InlineConfig) -> InlineConfig + Send + Sync + 'static,
    {
        self.server_build = Some(Arc::new(hook));
        self
    }

    pub fn client_build<F>(mut self, hook: F) -> Self
    where
        F: Fn(InlineConfig) -> InlineConfig + Send + Sync + 'static,
    {
        self.client_build = Some(Arc::new(hook));
        self
    }

    pub fn server_plugin(mut self, plugin: impl HostPlugin + 'static) -> Self {
        self.server_plugins.push(Arc::new(plugin));
        self
    }

    pub fn client_plugin(mut self, plugin: impl HostPlugin + 'static) -> Self {
        self.client_plugins.push(Arc::new(plugin));
        self
    }

    pub fn server_plugins(mut self, plugins: impl IntoIterator<Item = SharedHostPlugin>) -> Self {
        self.server_plugins.extend(plugins);
        self
    }

    pub fn client_plugins(mut self, plugins: impl IntoIterator<Item = SharedHostPlugin>) -> Self {
        self.client_plugins.extend(plugins);
        self
    }

    /// Resolve the options against the defaults.
    ///
    /// Configuration errors surface here, before any build activity.
    pub fn resolve(self) -> Result<BuildPlan> {
        let config = resolve(&self.options)?;
        Ok(BuildPlan {
            config,
            server_build: self.server_build.unwrap_or_else(identity_hook),
            client_build: self.client_build.unwrap_or_else(identity_hook),
            server_plugins: self.server_plugins,
            client_plugins: self.client_plugins,
        })
    }
}
