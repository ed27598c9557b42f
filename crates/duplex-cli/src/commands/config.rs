//! Layered configuration loading shared by the commands.

use duplex_config::{BuildMode, ConfigDiscovery, ResolvedConfig, merge_values, resolve_value};
use serde_json::{Map, Value};
use tracing::debug;

use crate::cli::ConfigArgs;
use crate::error::{CliError, Result};
use crate::ui;

/// Load the project configuration: file, then `DUPLEX_*` environment
/// variables, then command-line flags.
///
/// A missing config file is only an error when the flags do not supply the
/// required `server_entry` either.
pub fn load_config(args: &ConfigArgs) -> Result<ResolvedConfig> {
    if !args.root.is_dir() {
        return Err(CliError::RootNotFound(args.root.clone()));
    }

    let discovery = ConfigDiscovery::new(&args.root);
    let mut value = match &args.config {
        Some(path) => discovery.load_value_from(path)?,
        None => {
            if discovery.find().is_none() {
                if args.server_entry.is_none() {
                    return Err(duplex_config::ConfigError::NotFound(args.root.clone()).into());
                }
                ui::warning("No duplex.toml found, using defaults and command-line options");
            }
            discovery.load_value()?
        }
    };

    let flags = flag_overrides(args);
    debug!(overrides = %flags, "applying command-line overrides");
    merge_values(&mut value, &flags);

    Ok(resolve_value(value)?)
}

fn flag_overrides(args: &ConfigArgs) -> Value {
    let mut flags = Map::new();
    if let Some(mode) = args.mode {
        flags.insert(
            "mode".to_string(),
            Value::String(BuildMode::from(mode).as_str().to_string()),
        );
    }
    if let Some(entry) = &args.server_entry {
        flags.insert("server_entry".to_string(), Value::String(entry.clone()));
    }
    Value::Object(flags)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Mode;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn args(root: PathBuf) -> ConfigArgs {
        ConfigArgs {
            root,
            config: None,
            mode: None,
            server_entry: None,
        }
    }

    #[test]
    fn flags_override_file() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("duplex.toml"),
            "mode = \"server-first\"\nserver_entry = \"server/main.js\"\n",
        )
        .unwrap();

        let mut args = args(dir.path().to_path_buf());
        args.mode = Some(Mode::Skip);
        args.server_entry = Some("server/other.js".to_string());

        let config = load_config(&args).unwrap();
        assert_eq!(config.mode, BuildMode::Skip);
        assert_eq!(config.server_entry, "server/other.js");
    }

    #[test]
    fn flags_alone_are_enough() {
        let dir = TempDir::new().unwrap();
        let mut args = args(dir.path().to_path_buf());
        args.server_entry = Some("server/main.js".to_string());

        let config = load_config(&args).unwrap();
        assert_eq!(config.mode, BuildMode::ServerFirst);
        assert_eq!(config.client_entry["main"], "index.html");
    }

    #[test]
    fn missing_config_and_entry_is_not_found() {
        let dir = TempDir::new().unwrap();
        let err = load_config(&args(dir.path().to_path_buf())).unwrap_err();
        assert!(matches!(
            err,
            CliError::Config(duplex_config::ConfigError::NotFound(_))
        ));
    }

    #[test]
    fn missing_root_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = load_config(&args(dir.path().join("nope"))).unwrap_err();
        assert!(matches!(err, CliError::RootNotFound(_)));
    }

    #[test]
    fn explicit_config_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ci.toml");
        fs::write(&path, "server_entry = \"srv.js\"\nmode = \"parallel\"\n[client_config]\nout_dir = \"web\"\n").unwrap();

        let mut args = args(dir.path().to_path_buf());
        args.config = Some(path);
        let config = load_config(&args).unwrap();
        assert_eq!(config.mode, BuildMode::Parallel);
        assert_eq!(config.client_config.out_dir, PathBuf::from("web"));
    }
}
