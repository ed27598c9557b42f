//! The host tool's draft configuration.
//!
//! `InlineConfig` is what gets handed to [`super::HostBuild::build`] and what
//! user build hooks receive and return. It mirrors the options a host bundler
//! accepts for one build: where to write, what to bundle, and how.

use std::path::PathBuf;

use duplex_config::{ExternalOption, MinifyOption, OutputNaming};
use indexmap::IndexMap;

use super::plugin::SharedHostPlugin;

/// A named entry module, as in `{ main: "index.html" }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInput {
    pub name: Option<String>,
    pub import: String,
}

impl EntryInput {
    pub fn new(name: impl Into<String>, import: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            import: import.into(),
        }
    }

    pub fn unnamed(import: impl Into<String>) -> Self {
        Self {
            name: None,
            import: import.into(),
        }
    }
}

/// Dependency externalization for server-side builds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SsrOptions {
    pub external: ExternalOption,
    pub no_external: ExternalOption,
}

#[derive(Debug, Clone)]
pub struct BuildSection {
    pub out_dir: PathBuf,
    /// Entry of a server-side build; `None` for a browser build.
    pub ssr: Option<String>,
    pub input: Vec<EntryInput>,
    pub write: bool,
    pub minify: MinifyOption,
    pub target: String,
    pub empty_out_dir: bool,
    pub copy_public_dir: bool,
    pub external: ExternalOption,
    pub output: OutputNaming,
}

impl Default for BuildSection {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("dist"),
            ssr: None,
            input: Vec::new(),
            write: true,
            minify: MinifyOption::Toggle(true),
            target: "modules".to_string(),
            empty_out_dir: true,
            copy_public_dir: true,
            external: ExternalOption::none(),
            output: OutputNaming::client(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InlineConfig {
    /// Project root; the host's own root is used when unset.
    pub root: Option<PathBuf>,
    /// Directory of static files copied verbatim into `build.out_dir`.
    pub public_dir: Option<PathBuf>,
    /// Identifier -> replacement expression.
    pub define: IndexMap<String, String>,
    pub ssr: SsrOptions,
    pub build: BuildSection,
    pub plugins: Vec<SharedHostPlugin>,
}

impl InlineConfig {
    pub fn is_ssr(&self) -> bool {
        self.build.ssr.is_some()
    }

    /// The modules this build starts from: the ssr entry for server builds,
    /// the `input` list otherwise.
    pub fn entries(&self) -> Vec<EntryInput> {
        match &self.build.ssr {
            Some(entry) => vec![EntryInput::unnamed(entry.clone())],
            None => self.build.input.clone(),
        }
    }
}
