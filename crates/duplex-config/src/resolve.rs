//! Merge user options over the defaults.
//!
//! Objects merge field by field, recursively; arrays and scalars supplied by
//! the user replace the default outright. The `client_entry` map is a value
//! rather than a record of settings, so a user-supplied map replaces the
//! default `{ main: "index.html" }` instead of being merged into it.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{ClientConfig, ResolvedConfig, ServerConfig};
use crate::error::{ConfigError, Result};
use crate::options::UserOptions;
use crate::validation::validate;

const TOP_LEVEL_FIELDS: &[&str] = &[
    "mode",
    "server_entry",
    "server_config",
    "client_entry",
    "client_config",
];

/// Resolve typed user options into a fully-populated, validated configuration.
pub fn resolve(options: &UserOptions) -> Result<ResolvedConfig> {
    let value = serde_json::to_value(options)
        .map_err(|e| ConfigError::invalid("options", e.to_string()))?;
    resolve_value(value)
}

/// Resolve an untyped options object (as read from a config file).
///
/// # Errors
///
/// - [`ConfigError::MissingField`] when `server_entry` is absent or empty
/// - [`ConfigError::InvalidValue`] naming the offending field on unknown keys
///   or type mismatches
/// - any error from [`validate`]
pub fn resolve_value(user: Value) -> Result<ResolvedConfig> {
    let user = match strip_nulls(user) {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            return Err(ConfigError::invalid(
                "options",
                format!("expected an object, found {}", kind_of(&other)),
            ));
        }
    };

    for key in user.keys() {
        if !TOP_LEVEL_FIELDS.contains(&key.as_str()) {
            return Err(ConfigError::invalid(
                key.clone(),
                format!("unknown field, expected one of: {}", TOP_LEVEL_FIELDS.join(", ")),
            ));
        }
    }

    match user.get("server_entry") {
        Some(Value::String(entry)) if !entry.trim().is_empty() => {}
        None | Some(Value::String(_)) => {
            return Err(ConfigError::MissingField {
                field: "server_entry".to_string(),
            });
        }
        Some(other) => {
            return Err(ConfigError::invalid(
                "server_entry",
                format!("expected a path string, found {}", kind_of(other)),
            ));
        }
    }

    let defaults = defaults_value()?;
    let mut merged = defaults.clone();
    merge_values(&mut merged, &Value::Object(user));

    let config = deserialize_resolved(merged, &defaults)?;
    validate(&config)?;

    debug!(
        mode = %config.mode,
        server_entry = %config.server_entry,
        server_out_dir = %config.server_config.out_dir.display(),
        client_out_dir = %config.client_config.out_dir.display(),
        "resolved build configuration"
    );

    Ok(config)
}

/// Recursively merge `update` into `target`.
pub fn merge_values(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target_map), Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_values(target_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (target_slot, Value::Object(update_map)) => {
            *target_slot = Value::Object(update_map.clone());
        }
        (target_slot, _) => {
            *target_slot = update.clone();
        }
    }
}

fn defaults_value() -> Result<Value> {
    serde_json::to_value(ResolvedConfig::with_server_entry(String::new()))
        .map_err(|e| ConfigError::invalid("defaults", e.to_string()))
}

/// Drop `null` fields so that an explicit null means "not set".
fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}

fn deserialize_resolved(merged: Value, defaults: &Value) -> Result<ResolvedConfig> {
    match serde_json::from_value::<ResolvedConfig>(merged.clone()) {
        Ok(config) => Ok(config),
        Err(err) => Err(locate_invalid_field(&merged, defaults)
            .unwrap_or_else(|| ConfigError::invalid("options", err.to_string()))),
    }
}

/// Find which field made deserialization fail, so the error can name it.
fn locate_invalid_field(merged: &Value, defaults: &Value) -> Option<ConfigError> {
    let merged = merged.as_object()?;

    for (key, value) in merged {
        let error = match key.as_str() {
            "mode" => check::<crate::config::BuildMode>(value),
            "server_entry" => check::<String>(value),
            "client_entry" => check::<indexmap::IndexMap<String, String>>(value),
            "server_config" => {
                if let Some(err) = locate_section_field::<ServerConfig>(key, value, &defaults[key]) {
                    return Some(err);
                }
                check::<ServerConfig>(value)
            }
            "client_config" => {
                if let Some(err) = locate_section_field::<ClientConfig>(key, value, &defaults[key]) {
                    return Some(err);
                }
                check::<ClientConfig>(value)
            }
            _ => Some(format!(
                "unknown field, expected one of: {}",
                TOP_LEVEL_FIELDS.join(", ")
            )),
        };

        if let Some(hint) = error {
            return Some(ConfigError::invalid(key.clone(), hint));
        }
    }

    None
}

/// Narrow a failing section down to the single sub-field that breaks it.
///
/// Each sub-field is applied alone on top of the section defaults; the first
/// one that fails to deserialize is reported as `section.field`.
fn locate_section_field<T: DeserializeOwned>(
    section: &str,
    value: &Value,
    defaults: &Value,
) -> Option<ConfigError> {
    let Value::Object(fields) = value else {
        return Some(ConfigError::invalid(
            section,
            format!("expected a table, found {}", kind_of(value)),
        ));
    };

    for (field, field_value) in fields {
        let mut candidate = defaults.clone();
        if let Value::Object(map) = &mut candidate {
            map.insert(field.clone(), field_value.clone());
        }
        if let Some(hint) = check::<T>(&candidate) {
            return Some(ConfigError::invalid(format!("{section}.{field}"), hint));
        }
    }

    None
}

fn check<T: DeserializeOwned>(value: &Value) -> Option<String> {
    serde_json::from_value::<T>(value.clone())
        .err()
        .map(|e| e.to_string())
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
