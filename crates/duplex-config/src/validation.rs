//! Invariants a resolved configuration must satisfy before any build starts.

use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::config::{BuildMode, ExternalOption, ResolvedConfig};
use crate::error::{ConfigError, Result};

/// Validate a resolved configuration.
///
/// Rejects empty output directories, an empty client entry map, blank
/// external patterns, and output directories laid out so that one target's
/// `empty_out_dir` step would wipe the other target's output.
pub fn validate(config: &ResolvedConfig) -> Result<()> {
    if config.server_entry.trim().is_empty() {
        return Err(ConfigError::MissingField {
            field: "server_entry".to_string(),
        });
    }

    check_out_dir("server_config.out_dir", &config.server_config.out_dir)?;
    check_out_dir("client_config.out_dir", &config.client_config.out_dir)?;

    if config.client_entry.is_empty() {
        return Err(ConfigError::SchemaValidation {
            message: "client_entry must name at least one entry".to_string(),
            hint: Some("The default is { main = \"index.html\" }".to_string()),
        });
    }
    for (name, path) in &config.client_entry {
        if name.trim().is_empty() || path.trim().is_empty() {
            return Err(ConfigError::invalid(
                "client_entry",
                format!("entry '{name}' -> '{path}' has an empty name or path"),
            ));
        }
    }

    check_patterns("server_config.external", &config.server_config.external)?;
    check_patterns("server_config.no_external", &config.server_config.no_external)?;
    check_patterns("client_config.external", &config.client_config.external)?;

    if !config.mode.is_skip() {
        check_output_dirs(config)?;
    }

    Ok(())
}

/// An output directory must lie strictly inside the project root: emptying
/// it must never reach the sources.
fn check_out_dir(field: &str, out_dir: &Path) -> Result<()> {
    if out_dir.as_os_str().is_empty() {
        return Err(ConfigError::invalid(field, "output directory cannot be empty"));
    }
    if out_dir.is_absolute() || out_dir.has_root() {
        return Err(ConfigError::invalid(
            field,
            format!(
                "'{}' is absolute; use a directory relative to the project root",
                out_dir.display()
            ),
        ));
    }
    let cleaned = clean(out_dir);
    if cleaned == Path::new(".") || cleaned.starts_with("..") {
        return Err(ConfigError::invalid(
            field,
            format!(
                "'{}' is the project root or above it; emptying it would delete the sources",
                out_dir.display()
            ),
        ));
    }
    Ok(())
}

fn check_patterns(field: &str, option: &ExternalOption) -> Result<()> {
    if option.patterns().iter().any(|p| p.trim().is_empty()) {
        return Err(ConfigError::SchemaValidation {
            message: format!("{field} cannot contain empty patterns"),
            hint: Some(format!("Remove empty strings from '{field}'")),
        });
    }
    Ok(())
}

fn check_output_dirs(config: &ResolvedConfig) -> Result<()> {
    let server = clean(&config.server_config.out_dir);
    let client = clean(&config.client_config.out_dir);
    let server_clears = config.server_config.empty_out_dir;
    let client_clears = config.client_config.empty_out_dir;

    let overlap = |reason: String| ConfigError::OverlappingOutputDirs {
        server: server.clone(),
        client: client.clone(),
        reason,
    };

    if server == client {
        if server_clears || client_clears {
            return Err(overlap(
                "both targets write to the same directory and one of them empties it first"
                    .to_string(),
            ));
        }
        return Ok(());
    }

    // The server directory contains the client one: emptying it after (or
    // while) the client writes destroys the client bundle.
    if client.starts_with(&server)
        && server_clears
        && matches!(config.mode, BuildMode::ClientFirst | BuildMode::Parallel)
    {
        return Err(overlap(format!(
            "the server build empties its directory after the client bundle is written in {} mode; \
             use server-first or set server_config.empty_out_dir = false",
            config.mode
        )));
    }

    if server.starts_with(&client)
        && client_clears
        && matches!(config.mode, BuildMode::ServerFirst | BuildMode::Parallel)
    {
        return Err(overlap(format!(
            "the client build empties its directory after the server bundle is written in {} mode; \
             use client-first or set client_config.empty_out_dir = false",
            config.mode
        )));
    }

    Ok(())
}

fn clean(path: &Path) -> PathBuf {
    path.to_path_buf().clean()
}
