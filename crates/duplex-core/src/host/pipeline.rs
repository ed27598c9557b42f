//! Ordered plugin pipeline for one host build.
//!
//! Collects the project's plugins plus the plugins of the build's own config,
//! drops those that do not apply to the running command, and orders the rest
//! by [`Enforce`] bucket. Sorting is stable, so registration order is kept
//! inside a bucket.

use tracing::{debug, trace};

use super::config::InlineConfig;
use super::plugin::{ConfigEnv, Enforce, HostContext, SharedHostPlugin};

pub struct PluginPipeline {
    plugins: Vec<(Enforce, SharedHostPlugin)>,
    env: ConfigEnv,
}

impl PluginPipeline {
    pub fn new(env: ConfigEnv) -> Self {
        Self {
            plugins: Vec::new(),
            env,
        }
    }

    /// Pipeline for a build of `config`, with `project` plugins first.
    pub fn prepare(project: &[SharedHostPlugin], config: &InlineConfig, env: ConfigEnv) -> Self {
        let mut pipeline = Self::new(env);
        for plugin in project.iter().chain(config.plugins.iter()) {
            pipeline.add(plugin.clone());
        }
        pipeline.sort();
        pipeline
    }

    /// Add a plugin if it applies to the pipeline's command.
    ///
    /// Sorting happens once in [`PluginPipeline::prepare`] or [`PluginPipeline::sort`].
    pub fn add(&mut self, plugin: SharedHostPlugin) {
        if !plugin.apply().matches(self.env.command) {
            trace!(plugin = %plugin.name(), "plugin does not apply to this command");
            return;
        }
        self.plugins.push((plugin.enforce(), plugin));
    }

    pub fn sort(&mut self) {
        self.plugins.sort_by_key(|(enforce, _)| *enforce);
    }

    pub fn env(&self) -> ConfigEnv {
        self.env
    }

    pub fn plugins(&self) -> impl Iterator<Item = &SharedHostPlugin> {
        self.plugins.iter().map(|(_, plugin)| plugin)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    /// Run every `config` hook in order.
    pub fn apply_config(&self, config: &mut InlineConfig) {
        for plugin in self.plugins() {
            plugin.config(config, &self.env);
        }
    }

    /// First plugin override for `specifier`, if any.
    pub fn resolve_id(&self, specifier: &str) -> Option<String> {
        self.plugins().find_map(|plugin| {
            let resolved = plugin.resolve_id(specifier)?;
            debug!(plugin = %plugin.name(), specifier, resolved = %resolved, "resolve_id override");
            Some(resolved)
        })
    }

    /// First plugin-provided source for `id`, if any.
    pub fn load(&self, id: &str) -> Option<String> {
        self.plugins().find_map(|plugin| plugin.load(id))
    }

    /// Run `build_start` hooks one after another; the first error stops the
    /// build and is returned as is.
    pub async fn build_start(&self, ctx: &HostContext) -> anyhow::Result<()> {
        for plugin in self.plugins() {
            trace!(plugin = %plugin.name(), "build_start");
            plugin.build_start(ctx).await?;
        }
        Ok(())
    }
}
