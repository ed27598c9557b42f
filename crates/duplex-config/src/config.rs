//! Fully-populated configuration types and their opinionated defaults.
//!
//! Everything in this module is the *resolved* shape: no field is optional
//! except where the host tool itself treats absence as meaningful. The
//! partial, user-facing shape lives in [`crate::options`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;

/// Order in which the server and client builds run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildMode {
    /// Build the server bundle, then the client bundle.
    #[default]
    ServerFirst,
    /// Build the client bundle, then the server bundle.
    ///
    /// The server build empties its directory last, so the default layout
    /// (`dist` containing `dist/public`) is rejected: move the client `out_dir`
    /// outside the server's or set `server_config.empty_out_dir = false`.
    ClientFirst,
    /// Start both builds together and wait for both.
    ///
    /// Either build may empty its directory while the other writes, so the
    /// two `out_dir`s must not contain each other when the containing one is
    /// emptied. The default layout (`dist` and `dist/public`) is rejected.
    Parallel,
    /// Leave the host build untouched; no nested builds are started.
    Skip,
}

impl BuildMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildMode::ServerFirst => "server-first",
            BuildMode::ClientFirst => "client-first",
            BuildMode::Parallel => "parallel",
            BuildMode::Skip => "skip",
        }
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, BuildMode::Skip)
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "server-first" => Ok(BuildMode::ServerFirst),
            "client-first" => Ok(BuildMode::ClientFirst),
            "parallel" => Ok(BuildMode::Parallel),
            "skip" => Ok(BuildMode::Skip),
            other => Err(ConfigError::invalid(
                "mode",
                format!(
                    "'{other}' is not a build mode. Expected: server-first, client-first, parallel, skip"
                ),
            )),
        }
    }
}

/// Which modules a target leaves out of its bundle.
///
/// `true` externalizes every bare import; a list externalizes the named
/// packages or patterns. An empty list bundles everything.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalOption {
    All(bool),
    Patterns(Vec<String>),
}

impl ExternalOption {
    pub fn none() -> Self {
        ExternalOption::Patterns(Vec::new())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, ExternalOption::All(true))
    }

    pub fn patterns(&self) -> &[String] {
        match self {
            ExternalOption::Patterns(patterns) => patterns,
            ExternalOption::All(_) => &[],
        }
    }

    /// True when nothing is externalized.
    pub fn is_empty(&self) -> bool {
        match self {
            ExternalOption::All(all) => !all,
            ExternalOption::Patterns(patterns) => patterns.is_empty(),
        }
    }
}

impl Default for ExternalOption {
    fn default() -> Self {
        Self::none()
    }
}

/// Named minifier, for configurations that pick one explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Minifier {
    Esbuild,
    Terser,
    Oxc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MinifyOption {
    Toggle(bool),
    Minifier(Minifier),
}

impl MinifyOption {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, MinifyOption::Toggle(false))
    }
}

impl From<bool> for MinifyOption {
    fn from(value: bool) -> Self {
        MinifyOption::Toggle(value)
    }
}

/// Module format of emitted chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Es,
    Cjs,
}

/// File naming templates for emitted entries, chunks and assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputNaming {
    pub format: OutputFormat,
    pub entry_file_names: String,
    pub chunk_file_names: String,
    pub asset_file_names: String,
}

impl OutputNaming {
    pub fn server() -> Self {
        Self {
            format: OutputFormat::Es,
            entry_file_names: "app.js".to_string(),
            chunk_file_names: "bin/[name]-[hash].js".to_string(),
            asset_file_names: "assets/[name]-[hash].[ext]".to_string(),
        }
    }

    pub fn client() -> Self {
        Self {
            format: OutputFormat::Es,
            entry_file_names: "assets/[name]-[hash].js".to_string(),
            chunk_file_names: "chunks/[name]-[hash].js".to_string(),
            asset_file_names: "assets/[name]-[hash].[ext]".to_string(),
        }
    }
}

/// Server target: an ssr-style build of a single entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    pub external: ExternalOption,
    /// Modules that are always bundled, even when `external` matches them.
    pub no_external: ExternalOption,
    pub output: OutputNaming,
    pub minify: MinifyOption,
    pub target: String,
    pub out_dir: PathBuf,
    pub empty_out_dir: bool,
    /// Static files copied next to the server bundle.
    pub private_dir: PathBuf,
    /// Compile-time constant substitutions, identifier -> expression.
    pub define: IndexMap<String, Value>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            external: ExternalOption::none(),
            no_external: ExternalOption::none(),
            output: OutputNaming::server(),
            minify: MinifyOption::Toggle(false),
            target: "esnext".to_string(),
            out_dir: PathBuf::from("dist"),
            empty_out_dir: true,
            private_dir: PathBuf::from("private"),
            define: IndexMap::new(),
        }
    }
}

/// Client target: a browser application build with named entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    pub external: ExternalOption,
    pub output: OutputNaming,
    pub minify: MinifyOption,
    pub target: String,
    pub out_dir: PathBuf,
    pub empty_out_dir: bool,
    pub public_dir: PathBuf,
    pub define: IndexMap<String, Value>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            external: ExternalOption::none(),
            output: OutputNaming::client(),
            minify: MinifyOption::Toggle(true),
            target: "modules".to_string(),
            out_dir: PathBuf::from("dist/public"),
            empty_out_dir: true,
            public_dir: PathBuf::from("public"),
            define: IndexMap::new(),
        }
    }
}

/// The resolved configuration for one top-level build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedConfig {
    pub mode: BuildMode,
    pub server_entry: String,
    pub server_config: ServerConfig,
    /// Output name -> entry path.
    pub client_entry: IndexMap<String, String>,
    pub client_config: ClientConfig,
}

impl ResolvedConfig {
    /// Defaults for every field, with the given server entry.
    pub fn with_server_entry(server_entry: impl Into<String>) -> Self {
        Self {
            mode: BuildMode::default(),
            server_entry: server_entry.into(),
            server_config: ServerConfig::default(),
            client_entry: default_client_entry(),
            client_config: ClientConfig::default(),
        }
    }
}

pub fn default_client_entry() -> IndexMap<String, String> {
    let mut entries = IndexMap::new();
    entries.insert("main".to_string(), "index.html".to_string());
    entries
}

/// Render a `define` value as the expression text substituted into code.
///
/// Strings are taken verbatim (they already hold an expression such as
/// `"\"/api\""`); any other JSON value is inserted as its JSON literal.
pub fn define_expression(value: &Value) -> String {
    match value {
        Value::String(expr) => expr.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn build_mode_round_trips_kebab_case() {
        assert_eq!(
            serde_json::to_value(BuildMode::ClientFirst).unwrap(),
            json!("client-first")
        );
        let mode: BuildMode = serde_json::from_value(json!("parallel")).unwrap();
        assert_eq!(mode, BuildMode::Parallel);
    }

    #[test]
    fn build_mode_from_str_rejects_unknown() {
        assert_eq!("SKIP".parse::<BuildMode>().unwrap(), BuildMode::Skip);
        let err = "sometimes".parse::<BuildMode>().unwrap_err();
        assert_eq!(err.field(), Some("mode"));
    }

    #[test]
    fn external_option_accepts_bool_or_list() {
        let all: ExternalOption = serde_json::from_value(json!(true)).unwrap();
        assert!(all.is_all());
        let list: ExternalOption = serde_json::from_value(json!(["dotenv"])).unwrap();
        assert_eq!(list.patterns(), ["dotenv".to_string()]);
        assert!(ExternalOption::All(false).is_empty());
    }

    #[test]
    fn minify_accepts_bool_or_name() {
        let named: MinifyOption = serde_json::from_value(json!("terser")).unwrap();
        assert_eq!(named, MinifyOption::Minifier(Minifier::Terser));
        assert!(named.is_enabled());
        assert!(!MinifyOption::from(false).is_enabled());
    }

    #[test]
    fn define_expression_keeps_strings_verbatim() {
        assert_eq!(define_expression(&json!("\"/api\"")), "\"/api\"");
        assert_eq!(define_expression(&json!(3001)), "3001");
        assert_eq!(define_expression(&json!(true)), "true");
    }
}
