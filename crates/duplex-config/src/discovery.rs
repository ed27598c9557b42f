//! File-based config discovery for CLI use
//!
//! Finds `duplex.toml` (or a `duplex` field in `package.json`) under a root
//! directory and layers `DUPLEX_*` environment overrides on top. Library
//! users build [`crate::UserOptions`] directly instead.

use std::fs;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Serialized};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::ResolvedConfig;
use crate::error::{ConfigError, Result};
use crate::resolve::resolve_value;

pub const CONFIG_FILE_NAME: &str = "duplex.toml";
pub const PACKAGE_JSON_FIELD: &str = "duplex";
pub const DEFAULT_ENV_PREFIX: &str = "DUPLEX_";

/// File-based configuration discovery
///
/// # Example
///
/// ```no_run
/// use duplex_config::ConfigDiscovery;
///
/// let config = ConfigDiscovery::new(".").load().unwrap();
/// println!("building {}", config.server_entry);
/// ```
pub struct ConfigDiscovery {
    root: PathBuf,
    env_prefix: String,
}

impl ConfigDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
        }
    }

    /// Override the environment variable prefix (`DUPLEX_` by default).
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Find a config file in the root directory
    ///
    /// Searches in this order:
    /// 1. `duplex.toml`
    /// 2. `package.json` with a `duplex` field
    pub fn find(&self) -> Option<PathBuf> {
        let toml_path = self.root.join(CONFIG_FILE_NAME);
        if toml_path.exists() {
            return Some(toml_path);
        }

        let pkg_path = self.root.join("package.json");
        if pkg_path.exists() {
            if let Ok(content) = fs::read_to_string(&pkg_path) {
                if let Ok(parsed) = serde_json::from_str::<Value>(&content) {
                    if parsed
                        .get(PACKAGE_JSON_FIELD)
                        .is_some_and(|field| !field.is_null())
                    {
                        return Some(pkg_path);
                    }
                }
            }
        }

        None
    }

    /// Load and resolve the discovered config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if no config file is found.
    pub fn load(&self) -> Result<ResolvedConfig> {
        let path = self
            .find()
            .ok_or_else(|| ConfigError::NotFound(self.root.clone()))?;
        resolve_value(self.layer_env(self.read_file(&path)?)?)
    }

    /// Load the raw option tree with environment overrides applied.
    ///
    /// A missing config file yields an empty tree, so callers can still
    /// supply every option from the environment or command line.
    pub fn load_value(&self) -> Result<Value> {
        let file_value = match self.find() {
            Some(path) => self.read_file(&path)?,
            None => {
                debug!(root = %self.root.display(), "no config file found");
                Value::Object(Map::new())
            }
        };
        self.layer_env(file_value)
    }

    /// Load the raw option tree from a specific file, with environment overrides.
    pub fn load_value_from(&self, path: &Path) -> Result<Value> {
        self.layer_env(self.read_file(path)?)
    }

    fn read_file(&self, path: &Path) -> Result<Value> {
        debug!(path = %path.display(), "reading config file");

        if path.file_name() == Some(std::ffi::OsStr::new("package.json")) {
            return self.read_package_json(path);
        }

        let content = fs::read_to_string(path)?;
        let toml_val: toml::Value = toml::from_str(&content)
            .map_err(|e| ConfigError::invalid("toml", format!("Invalid TOML syntax: {e}")))?;

        serde_json::to_value(toml_val)
            .map_err(|e| ConfigError::invalid("toml", format!("TOML to JSON conversion failed: {e}")))
    }

    fn read_package_json(&self, path: &Path) -> Result<Value> {
        let content = fs::read_to_string(path)?;
        let parsed: Value = serde_json::from_str(&content)
            .map_err(|e| ConfigError::invalid("package.json", format!("Invalid JSON: {e}")))?;

        match parsed.get(PACKAGE_JSON_FIELD) {
            Some(Value::Null) | None => Err(ConfigError::invalid(
                PACKAGE_JSON_FIELD,
                "Add a 'duplex' field to your package.json",
            )),
            Some(value) => Ok(value.clone()),
        }
    }

    /// Apply `PREFIX_SECTION__FIELD=value` environment overrides.
    fn layer_env(&self, value: Value) -> Result<Value> {
        Figment::from(Serialized::defaults(value))
            .merge(Env::prefixed(&self.env_prefix).split("__"))
            .extract::<Value>()
            .map_err(|e| ConfigError::invalid("environment", e.to_string()))
    }
}
