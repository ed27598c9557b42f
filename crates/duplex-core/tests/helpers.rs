//! A host that bundles nothing and records what it was asked to do.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use async_trait::async_trait;
use duplex_core::host::{ConfigEnv, EntryInput, HostBuild, HostContext, InlineConfig, PluginPipeline, SharedHostPlugin};
use duplex_core::NOOP_ENTRY_ID;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Started(&'static str),
    Loaded { id: String, code: String },
    Wrote(&'static str),
    Failed(&'static str),
    Finished(&'static str),
}

/// One build as the host saw it after the config hooks ran.
#[derive(Debug, Clone)]
pub struct BuildRecord {
    pub label: &'static str,
    pub config: InlineConfig,
    pub plugins: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
#[error("{target} build failed")]
pub struct HostFailure {
    pub target: &'static str,
}

pub struct RecordingHost {
    this: Weak<RecordingHost>,
    project_plugins: Vec<SharedHostPlugin>,
    delays: HashMap<&'static str, Duration>,
    fail: Option<&'static str>,
    events: Mutex<Vec<Event>>,
    records: Mutex<Vec<BuildRecord>>,
}

#[derive(Default)]
pub struct RecordingHostBuilder {
    project_plugins: Vec<SharedHostPlugin>,
    delays: HashMap<&'static str, Duration>,
    fail: Option<&'static str>,
}

impl RecordingHostBuilder {
    pub fn plugins(mut self, plugins: Vec<SharedHostPlugin>) -> Self {
        self.project_plugins.extend(plugins);
        self
    }

    pub fn delay(mut self, label: &'static str, millis: u64) -> Self {
        self.delays.insert(label, Duration::from_millis(millis));
        self
    }

    pub fn fail(mut self, label: &'static str) -> Self {
        self.fail = Some(label);
        self
    }

    pub fn build(self) -> Arc<RecordingHost> {
        Arc::new_cyclic(|this| RecordingHost {
            this: this.clone(),
            project_plugins: self.project_plugins,
            delays: self.delays,
            fail: self.fail,
            events: Mutex::new(Vec::new()),
            records: Mutex::new(Vec::new()),
        })
    }
}

impl RecordingHost {
    pub fn builder() -> RecordingHostBuilder {
        RecordingHostBuilder::default()
    }

    pub fn with_plugins(plugins: Vec<SharedHostPlugin>) -> Arc<Self> {
        Self::builder().plugins(plugins).build()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<BuildRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn record(&self, label: &str) -> BuildRecord {
        self.records()
            .into_iter()
            .find(|r| r.label == label)
            .unwrap_or_else(|| panic!("no {label} build recorded"))
    }

    /// `Started`/`Finished` events of the server and client builds only.
    pub fn target_events(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| match e {
                Event::Started(l) | Event::Finished(l) => *l != "outer",
                _ => false,
            })
            .collect()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.events().iter().filter(|e| *e == event).count()
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

fn label_of(config: &InlineConfig) -> &'static str {
    if config.is_ssr() {
        "server"
    } else if config.build.input.is_empty()
        || config.build.input.iter().any(|e| e.import == NOOP_ENTRY_ID)
    {
        "outer"
    } else {
        "client"
    }
}

/// The draft config of a top-level build of `index.html`.
pub fn top_level_config() -> InlineConfig {
    let mut config = InlineConfig::default();
    config.build.input = vec![EntryInput::new("main", "index.html")];
    config
}

#[async_trait]
impl HostBuild for RecordingHost {
    async fn build(&self, mut config: InlineConfig) -> anyhow::Result<()> {
        let pipeline = PluginPipeline::prepare(&self.project_plugins, &config, ConfigEnv::build());
        pipeline.apply_config(&mut config);

        let label = label_of(&config);
        self.records.lock().unwrap().push(BuildRecord {
            label,
            config: config.clone(),
            plugins: pipeline.plugins().map(|p| p.name().into_owned()).collect(),
        });
        self.push(Event::Started(label));

        let host: Arc<dyn HostBuild> = self.this.upgrade().expect("host dropped");
        let ctx = HostContext::new(host, pipeline.env());
        if let Err(err) = pipeline.build_start(&ctx).await {
            self.push(Event::Failed(label));
            return Err(err);
        }

        for entry in config.entries() {
            let id = pipeline.resolve_id(&entry.import).unwrap_or(entry.import);
            if let Some(code) = pipeline.load(&id) {
                self.push(Event::Loaded { id, code });
            }
        }

        if let Some(delay) = self.delays.get(label) {
            tokio::time::sleep(*delay).await;
        }
        if self.fail == Some(label) {
            self.push(Event::Failed(label));
            return Err(HostFailure { target: label }.into());
        }
        if config.build.write {
            self.push(Event::Wrote(label));
        }
        self.push(Event::Finished(label));
        Ok(())
    }
}
