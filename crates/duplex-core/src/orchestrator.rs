//! Runs the two nested builds in the order the plan's mode asks for.

use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use duplex_config::{BuildMode, ExternalOption, define_expression};
use indexmap::IndexMap;
use serde_json::Value;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument};

use crate::error::{Error, Result, Target};
use crate::guard::BuildContext;
use crate::host::{BuildSection, EntryInput, HostBuild, InlineConfig, SsrOptions};
use crate::plan::BuildPlan;

pub struct Orchestrator {
    plan: Arc<BuildPlan>,
    host: Arc<dyn HostBuild>,
}

impl Orchestrator {
    pub fn new(plan: Arc<BuildPlan>, host: Arc<dyn HostBuild>) -> Self {
        Self { plan, host }
    }

    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    /// The server build's configuration, after the user's `server_build` hook.
    pub fn server_config(&self) -> Result<InlineConfig> {
        let config = &self.plan.config;
        let server = &config.server_config;
        let draft = InlineConfig {
            root: None,
            public_dir: Some(server.private_dir.clone()),
            define: render_define(&server.define),
            ssr: SsrOptions {
                external: server.external.clone(),
                no_external: server.no_external.clone(),
            },
            build: BuildSection {
                out_dir: server.out_dir.clone(),
                ssr: Some(config.server_entry.clone()),
                input: Vec::new(),
                write: true,
                minify: server.minify,
                target: server.target.clone(),
                empty_out_dir: server.empty_out_dir,
                copy_public_dir: true,
                external: ExternalOption::none(),
                output: server.output.clone(),
            },
            plugins: self.plan.server_plugins.clone(),
        };

        let built = (self.plan.server_build)(draft);
        check_hook_output(Target::Server, &built)?;
        Ok(built)
    }

    /// The client build's configuration, after the user's `client_build` hook.
    pub fn client_config(&self) -> Result<InlineConfig> {
        let config = &self.plan.config;
        let client = &config.client_config;
        let draft = InlineConfig {
            root: None,
            public_dir: Some(client.public_dir.clone()),
            define: render_define(&client.define),
            ssr: SsrOptions::default(),
            build: BuildSection {
                out_dir: client.out_dir.clone(),
                ssr: None,
                input: config
                    .client_entry
                    .iter()
                    .map(|(name, path)| EntryInput::new(name.clone(), path.clone()))
                    .collect(),
                write: true,
                minify: client.minify,
                target: client.target.clone(),
                empty_out_dir: client.empty_out_dir,
                copy_public_dir: true,
                external: client.external.clone(),
                output: client.output.clone(),
            },
            plugins: self.plan.client_plugins.clone(),
        };

        let built = (self.plan.client_build)(draft);
        check_hook_output(Target::Client, &built)?;
        Ok(built)
    }

    /// Run both nested builds.
    ///
    /// Does nothing for a nested context or in skip mode. Both configurations
    /// are built before the first build starts, so a broken hook fails the run
    /// without any output being touched. Host errors are returned unchanged.
    #[instrument(skip_all, fields(mode = %self.plan.mode()))]
    pub async fn run(&self, ctx: &BuildContext) -> anyhow::Result<()> {
        let mode = self.plan.mode();
        if ctx.is_nested_invocation || mode.is_skip() {
            debug!(nested = ctx.is_nested_invocation, "orchestrator not started");
            return Ok(());
        }

        let server = self.server_config()?;
        let client = self.client_config()?;

        let start = Instant::now();
        info!("starting server and client builds");
        match mode {
            BuildMode::ServerFirst => {
                self.build(Target::Server, server).await?;
                self.build(Target::Client, client).await?;
            }
            BuildMode::ClientFirst => {
                self.build(Target::Client, client).await?;
                self.build(Target::Server, server).await?;
            }
            BuildMode::Parallel => self.build_parallel(server, client).await?,
            BuildMode::Skip => return Ok(()),
        }
        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "server and client builds finished"
        );
        Ok(())
    }

    async fn build(&self, target: Target, config: InlineConfig) -> anyhow::Result<()> {
        let start = Instant::now();
        info!(%target, out_dir = %config.build.out_dir.display(), "build started");
        self.host.build(config).await?;
        info!(%target, elapsed_ms = start.elapsed().as_millis() as u64, "build finished");
        Ok(())
    }

    /// Both builds run as tasks on the current runtime. The first failure is
    /// returned; the other task is detached and keeps running to completion.
    async fn build_parallel(&self, server: InlineConfig, client: InlineConfig) -> anyhow::Result<()> {
        let mut join_set = JoinSet::new();

        for (target, config) in [(Target::Server, server), (Target::Client, client)] {
            let host = Arc::clone(&self.host);
            join_set.spawn(async move {
                info!(%target, out_dir = %config.build.out_dir.display(), "build started");
                let result = host.build(config).await;
                (target, result)
            });
        }

        while let Some(res) = join_set.join_next().await {
            match res {
                Ok((target, Ok(()))) => info!(%target, "build finished"),
                Ok((target, Err(err))) => {
                    debug!(%target, "build failed, detaching the remaining build");
                    join_set.detach_all();
                    return Err(err);
                }
                Err(join_err) => {
                    join_set.detach_all();
                    return Err(anyhow!("build task panicked: {join_err}"));
                }
            }
        }
        Ok(())
    }
}

fn render_define(define: &IndexMap<String, Value>) -> IndexMap<String, String> {
    define
        .iter()
        .map(|(key, value)| (key.clone(), define_expression(value)))
        .collect()
}

fn check_hook_output(target: Target, config: &InlineConfig) -> Result<()> {
    let invalid = |reason: &str| Error::InvalidHookOutput {
        target,
        reason: reason.to_string(),
    };

    if config.build.out_dir.as_os_str().is_empty() {
        return Err(invalid("build.out_dir is empty"));
    }
    match target {
        Target::Server => match &config.build.ssr {
            Some(entry) if !entry.is_empty() => {}
            _ => return Err(invalid("build.ssr must name the server entry")),
        },
        Target::Client => {
            if config.build.ssr.is_some() {
                return Err(invalid("build.ssr must not be set for the client build"));
            }
            if config.build.input.is_empty() {
                return Err(invalid("build.input has no entries"));
            }
        }
    }
    Ok(())
}
