//! Translation of a host [`InlineConfig`] into Rolldown options.

use std::path::Path;

use duplex_config::{ExternalOption, OutputFormat};
use duplex_core::host::{EntryInput, InlineConfig};
use path_clean::PathClean;
use rolldown::{BundlerOptions, InputItem, Platform, RawMinifyOptions};
use tracing::debug;

pub fn bundler_options(config: &InlineConfig, root: &Path, inputs: &[EntryInput]) -> BundlerOptions {
    let naming = &config.build.output;

    let format = match naming.format {
        OutputFormat::Es => rolldown::OutputFormat::Esm,
        OutputFormat::Cjs => rolldown::OutputFormat::Cjs,
    };
    let platform = if config.is_ssr() {
        Platform::Node
    } else {
        Platform::Browser
    };
    debug!(target = %config.build.target, "language target left to the bundler default");

    BundlerOptions {
        input: Some(
            inputs
                .iter()
                .map(|entry| InputItem {
                    name: entry.name.clone(),
                    import: entry_import(root, &entry.import),
                })
                .collect(),
        ),
        cwd: Some(root.to_path_buf()),
        format: Some(format),
        platform: Some(platform),
        minify: config
            .build
            .minify
            .is_enabled()
            .then(|| RawMinifyOptions::from(true)),
        entry_filenames: Some(naming.entry_file_names.clone().into()),
        chunk_filenames: Some(naming.chunk_file_names.clone().into()),
        asset_filenames: Some(naming.asset_file_names.clone().into()),
        ..Default::default()
    }
}

/// Relative entries are taken from the project root, not the process cwd.
fn entry_import(root: &Path, import: &str) -> String {
    if import.starts_with('\0') || Path::new(import).is_absolute() {
        return import.to_string();
    }
    root.join(import).clean().to_string_lossy().into_owned()
}

/// Which bare imports stay out of the bundle.
///
/// Server builds combine `ssr.external` with `build.external`; anything
/// matched by `ssr.no_external` is always bundled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalPolicy {
    all: bool,
    patterns: Vec<String>,
    bundle_all: bool,
    bundled: Vec<String>,
}

impl ExternalPolicy {
    pub fn from_config(config: &InlineConfig) -> Self {
        let mut policy = Self::default();
        policy.add_external(&config.build.external);
        if config.is_ssr() {
            policy.add_external(&config.ssr.external);
            policy.bundle_all = config.ssr.no_external.is_all();
            policy.bundled = config.ssr.no_external.patterns().to_vec();
        }
        policy
    }

    fn add_external(&mut self, option: &ExternalOption) {
        self.all |= option.is_all();
        self.patterns.extend(option.patterns().iter().cloned());
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.patterns.is_empty()
    }

    pub fn is_external(&self, specifier: &str) -> bool {
        if !is_bare(specifier) {
            return false;
        }
        if self.bundle_all || self.bundled.iter().any(|p| matches_package(p, specifier)) {
            return false;
        }
        self.all || self.patterns.iter().any(|p| matches_package(p, specifier))
    }
}

fn is_bare(specifier: &str) -> bool {
    !(specifier.is_empty()
        || specifier.starts_with('.')
        || specifier.starts_with('/')
        || specifier.starts_with('\0')
        || Path::new(specifier).is_absolute())
}

/// `react` matches `react` and `react/jsx-runtime`, not `react-dom`.
fn matches_package(pattern: &str, specifier: &str) -> bool {
    specifier == pattern
        || specifier
            .strip_prefix(pattern)
            .is_some_and(|rest| rest.starts_with('/'))
}
