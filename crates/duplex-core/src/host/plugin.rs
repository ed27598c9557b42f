//! Plugin and build-API seams of the host tool.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::config::InlineConfig;

pub type SharedHostPlugin = Arc<dyn HostPlugin>;

/// Which host command is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Build,
    Serve,
}

/// Ordering bucket of a plugin. Plugins run `Pre`, then `Normal`, then
/// `Post`, keeping registration order inside a bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Enforce {
    Pre = 0,
    #[default]
    Normal = 10,
    Post = 20,
}

/// Commands a plugin participates in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Apply {
    Build,
    Serve,
    #[default]
    Both,
}

impl Apply {
    pub fn matches(&self, command: Command) -> bool {
        match self {
            Apply::Both => true,
            Apply::Build => command == Command::Build,
            Apply::Serve => command == Command::Serve,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigEnv {
    pub command: Command,
}

impl ConfigEnv {
    pub fn build() -> Self {
        Self {
            command: Command::Build,
        }
    }

    pub fn serve() -> Self {
        Self {
            command: Command::Serve,
        }
    }
}

/// The host's programmatic build API.
///
/// One call is one complete build: the host re-reads its project plugins,
/// runs their hooks, bundles, and (when `build.write` is set) writes output.
#[async_trait]
pub trait HostBuild: Send + Sync {
    async fn build(&self, config: InlineConfig) -> anyhow::Result<()>;
}

/// Handed to `build_start` hooks.
#[derive(Clone)]
pub struct HostContext {
    pub host: Arc<dyn HostBuild>,
    pub env: ConfigEnv,
}

impl HostContext {
    pub fn new(host: Arc<dyn HostBuild>, env: ConfigEnv) -> Self {
        Self { host, env }
    }
}

impl fmt::Debug for HostContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostContext")
            .field("env", &self.env)
            .finish_non_exhaustive()
    }
}

/// A plugin of the host tool.
///
/// Every hook has a pass-through default, so a plugin only implements what it
/// needs. `resolve_id` and `load` return `None` to let the next plugin (or the
/// host's default behavior) handle the request.
#[async_trait]
pub trait HostPlugin: Send + Sync + fmt::Debug {
    fn name(&self) -> Cow<'static, str>;

    fn enforce(&self) -> Enforce {
        Enforce::Normal
    }

    fn apply(&self) -> Apply {
        Apply::Both
    }

    /// Adjust the draft configuration before the build is set up.
    fn config(&self, _config: &mut InlineConfig, _env: &ConfigEnv) {}

    fn resolve_id(&self, _specifier: &str) -> Option<String> {
        None
    }

    fn load(&self, _id: &str) -> Option<String> {
        None
    }

    /// Runs once per build, after configuration and before bundling. An error
    /// fails the build.
    async fn build_start(&self, _ctx: &HostContext) -> anyhow::Result<()> {
        Ok(())
    }
}
