//! HTML entry pages.
//!
//! Rolldown only bundles JavaScript, so an `.html` entry is split into the
//! module scripts it references. Each `<script type="module" src="...">`
//! becomes a named entry; after bundling the page is written out with its
//! `src` attributes pointing at the emitted chunks.

use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use duplex_core::host::EntryInput;
use path_clean::PathClean;
use regex::Regex;
use tracing::debug;

use crate::error::{HostError, Result};

static SCRIPT_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script\b[^>]*>").expect("valid script tag regex"));
static MODULE_TYPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\btype\s*=\s*["']?module["']?"#).expect("valid type regex")
});
static SRC_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bsrc\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid src regex")
});

/// The `src` of one module script and where its value sits in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleScript {
    pub src: String,
    pub range: Range<usize>,
}

/// Find the module scripts with a `src` attribute, in document order.
pub fn module_scripts(html: &str) -> Vec<ModuleScript> {
    let mut scripts = Vec::new();
    for tag in SCRIPT_TAG.find_iter(html) {
        let text = tag.as_str();
        if !MODULE_TYPE.is_match(text) {
            continue;
        }
        let Some(caps) = SRC_ATTR.captures(text) else {
            continue;
        };
        let Some(value) = caps.get(1).or_else(|| caps.get(2)) else {
            continue;
        };
        scripts.push(ModuleScript {
            src: value.as_str().to_string(),
            range: tag.start() + value.start()..tag.start() + value.end(),
        });
    }
    scripts
}

pub fn is_html_entry(import: &str) -> bool {
    !import.starts_with('\0') && import.ends_with(".html")
}

fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://") || src.starts_with("//")
}

/// A page entry and the bundler entries created for its scripts.
#[derive(Debug, Clone)]
pub struct HtmlPage {
    /// Where the page is written, relative to the output directory.
    pub output_name: PathBuf,
    pub html: String,
    /// Script and the name of the bundler entry built from it.
    pub scripts: Vec<(ModuleScript, String)>,
}

impl HtmlPage {
    /// The page with each bundled script pointing at `/<emitted file>`.
    ///
    /// `entry_files` maps bundler entry names to emitted file names.
    pub fn render(&self, entry_files: &HashMap<String, String>) -> String {
        let mut out = String::with_capacity(self.html.len());
        let mut cursor = 0;
        for (script, entry_name) in &self.scripts {
            let Some(file) = entry_files.get(entry_name) else {
                continue;
            };
            out.push_str(&self.html[cursor..script.range.start]);
            out.push('/');
            out.push_str(file.trim_start_matches('/'));
            cursor = script.range.end;
        }
        out.push_str(&self.html[cursor..]);
        out
    }
}

/// Bundler inputs after splitting HTML entries, plus the pages to emit.
#[derive(Debug, Default)]
pub struct ExpandedEntries {
    pub inputs: Vec<EntryInput>,
    pub pages: Vec<HtmlPage>,
}

/// Replace every HTML entry with the module scripts it references. Other
/// entries pass through untouched.
pub fn expand_entries(root: &Path, entries: Vec<EntryInput>) -> Result<ExpandedEntries> {
    let mut expanded = ExpandedEntries::default();

    for entry in entries {
        if !is_html_entry(&entry.import) {
            expanded.inputs.push(entry);
            continue;
        }

        let path = root.join(&entry.import).clean();
        let html = std::fs::read_to_string(&path).map_err(|source| HostError::HtmlEntry {
            path: path.clone(),
            source,
        })?;
        let page_dir = path.parent().unwrap_or(root).to_path_buf();
        let base_name = entry.name.clone().unwrap_or_else(|| {
            path.file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| "index".to_string())
        });

        let mut scripts = Vec::new();
        for script in module_scripts(&html) {
            if is_remote(&script.src) {
                continue;
            }
            let module = match script.src.strip_prefix('/') {
                Some(rooted) => root.join(rooted),
                None => page_dir.join(&script.src),
            }
            .clean();
            let entry_name = if scripts.is_empty() {
                base_name.clone()
            } else {
                format!("{base_name}-{}", scripts.len() + 1)
            };
            expanded.inputs.push(EntryInput::new(
                entry_name.clone(),
                module.to_string_lossy().into_owned(),
            ));
            scripts.push((script, entry_name));
        }
        debug!(page = %path.display(), scripts = scripts.len(), "expanded html entry");

        expanded.pages.push(HtmlPage {
            output_name: output_name(root, &path),
            html,
            scripts,
        });
    }

    Ok(expanded)
}

fn output_name(root: &Path, page: &Path) -> PathBuf {
    match page.strip_prefix(root.clean()) {
        Ok(relative) => relative.to_path_buf(),
        Err(_) => page
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("index.html")),
    }
}
