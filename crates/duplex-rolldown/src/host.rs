//! [`HostBuild`] over Rolldown.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};
use std::time::Instant;

use anyhow::anyhow;
use async_trait::async_trait;
use duplex_core::host::{
    ConfigEnv, HostBuild, HostContext, InlineConfig, PluginPipeline, SharedHostPlugin,
};
use rolldown::BundlerBuilder as RolldownBundlerBuilder;
use rolldown_plugin::__inner::SharedPluginable;
use tracing::{debug, info, instrument};

use crate::error::HostError;
use crate::html::expand_entries;
use crate::options::{ExternalPolicy, bundler_options};
use crate::plugins::{DefinePlugin, HostPluginBridge};
use crate::writer;

/// A host build tool backed by Rolldown.
///
/// `project_plugins` play the role of the plugins in a project's own build
/// configuration: every build this host runs loads them, including builds
/// started from inside a plugin hook.
pub struct RolldownHost {
    this: Weak<RolldownHost>,
    root: PathBuf,
    project_plugins: Vec<SharedHostPlugin>,
}

/// What one build produced.
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub out_dir: PathBuf,
    pub files: Vec<PathBuf>,
    pub public_files: usize,
}

impl RolldownHost {
    pub fn new(root: impl Into<PathBuf>, project_plugins: Vec<SharedHostPlugin>) -> Arc<Self> {
        let root = root.into();
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            root,
            project_plugins,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn project_plugins(&self) -> &[SharedHostPlugin] {
        &self.project_plugins
    }

    fn handle(&self) -> anyhow::Result<Arc<dyn HostBuild>> {
        let host: Arc<dyn HostBuild> = self
            .this
            .upgrade()
            .ok_or_else(|| anyhow!("rolldown host dropped during build"))?;
        Ok(host)
    }

    fn resolve_root(&self, config: &InlineConfig) -> PathBuf {
        match &config.root {
            Some(root) => self.root.join(root),
            None => self.root.clone(),
        }
    }

    /// Run one build and report what was written.
    #[instrument(skip_all, fields(ssr = config.is_ssr()))]
    pub async fn run(&self, mut config: InlineConfig) -> anyhow::Result<BuildSummary> {
        let start = Instant::now();
        let pipeline = Arc::new(PluginPipeline::prepare(
            &self.project_plugins,
            &config,
            ConfigEnv::build(),
        ));
        pipeline.apply_config(&mut config);

        let ctx = HostContext::new(self.handle()?, pipeline.env());
        pipeline.build_start(&ctx).await?;

        let root = self.resolve_root(&config);
        let out_dir = root.join(&config.build.out_dir);
        if config.build.write && config.build.empty_out_dir {
            writer::ensure_inside_root(&root, &config.build.out_dir)?;
        }
        let expanded = expand_entries(&root, config.entries())?;

        let mut plugins: Vec<SharedPluginable> = vec![Arc::new(HostPluginBridge::new(
            Arc::clone(&pipeline),
            ExternalPolicy::from_config(&config),
        ))];
        if !config.define.is_empty() {
            plugins.push(Arc::new(DefinePlugin::new(config.define.clone())));
        }

        let options = bundler_options(&config, &root, &expanded.inputs);
        let mut bundler = RolldownBundlerBuilder::default()
            .with_options(options)
            .with_plugins(plugins)
            .build()
            .map_err(|e| HostError::from_rolldown_batch(&e))?;
        let output = bundler
            .generate()
            .await
            .map_err(|e| HostError::from_rolldown_batch(&e))?;

        let mut summary = BuildSummary {
            out_dir: out_dir.clone(),
            ..Default::default()
        };
        if !config.build.write {
            debug!(elapsed_ms = start.elapsed().as_millis() as u64, "bundle generated, write disabled");
            return Ok(summary);
        }

        if config.build.empty_out_dir {
            writer::empty_dir(&out_dir)?;
        }
        summary.files = writer::write_bundle(&output, &out_dir)?;

        let entry_files = writer::entry_files(&output);
        for page in &expanded.pages {
            let html = page.render(&entry_files);
            summary
                .files
                .push(writer::write_file(&out_dir, &page.output_name, html.as_bytes())?);
        }

        if let Some(public_dir) = config.public_dir.as_ref().filter(|_| config.build.copy_public_dir) {
            summary.public_files = writer::copy_dir(&root.join(public_dir), &out_dir)?;
        }

        info!(
            out_dir = %out_dir.display(),
            files = summary.files.len(),
            public_files = summary.public_files,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "bundle written"
        );
        Ok(summary)
    }
}

#[async_trait]
impl HostBuild for RolldownHost {
    async fn build(&self, config: InlineConfig) -> anyhow::Result<()> {
        self.run(config).await.map(|_| ())
    }
}
