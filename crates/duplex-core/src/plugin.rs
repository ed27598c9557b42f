//! The host plugins a project registers to get a paired build.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::guard::{DiversionPlugin, ReentrancyFlag};
use crate::host::{Apply, Enforce, HostContext, HostPlugin, SharedHostPlugin};
use crate::orchestrator::Orchestrator;
use crate::plan::{BuildPlan, BuilderOptions};

/// Starts the orchestrator from the outer build's `build_start`.
pub struct TriggerPlugin {
    plan: Arc<BuildPlan>,
    flag: ReentrancyFlag,
}

impl TriggerPlugin {
    pub const NAME: &'static str = "duplex";

    pub fn new(plan: Arc<BuildPlan>, flag: ReentrancyFlag) -> Self {
        Self { plan, flag }
    }
}

impl fmt::Debug for TriggerPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TriggerPlugin")
            .field("mode", &self.plan.mode())
            .field("flag", &self.flag)
            .finish()
    }
}

#[async_trait]
impl HostPlugin for TriggerPlugin {
    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(Self::NAME)
    }

    fn enforce(&self) -> Enforce {
        Enforce::Pre
    }

    fn apply(&self) -> Apply {
        Apply::Build
    }

    async fn build_start(&self, ctx: &HostContext) -> anyhow::Result<()> {
        if self.plan.mode().is_skip() {
            return Ok(());
        }
        let build_ctx = self.flag.enter();
        if build_ctx.is_nested_invocation {
            debug!("nested build, orchestrator already started");
            return Ok(());
        }
        Orchestrator::new(Arc::clone(&self.plan), Arc::clone(&ctx.host))
            .run(&build_ctx)
            .await
    }
}

/// Resolve `options` and return the plugins to register with the host, using
/// the process-wide reentrancy flag.
///
/// Configuration errors are returned here, before any build runs.
pub fn builder(options: BuilderOptions) -> Result<Vec<SharedHostPlugin>> {
    let plan = options.resolve()?;
    Ok(plugins_for(Arc::new(plan), ReentrancyFlag::process()))
}

/// The diversion and trigger plugins for `plan`, sharing `flag`.
pub fn plugins_for(plan: Arc<BuildPlan>, flag: ReentrancyFlag) -> Vec<SharedHostPlugin> {
    vec![
        Arc::new(DiversionPlugin::new(plan.mode(), flag.clone())),
        Arc::new(TriggerPlugin::new(plan, flag)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use duplex_config::UserOptions;

    #[test]
    fn builder_returns_both_plugins() {
        let plugins = builder(BuilderOptions::new("server/main.js")).unwrap();
        let names: Vec<_> = plugins.iter().map(|p| p.name()).collect();
        assert_eq!(names, ["duplex:skip", "duplex"]);
        assert!(plugins.iter().all(|p| p.enforce() == Enforce::Pre));
        assert!(plugins.iter().all(|p| p.apply() == Apply::Build));
    }

    #[test]
    fn builder_rejects_missing_server_entry() {
        let err = builder(BuilderOptions::from_options(UserOptions::default())).unwrap_err();
        assert!(err.to_string().contains("server_entry"));
    }
}
