//! Error types for configuration resolution, validation and loading.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("invalid config value for `{field}`{}", format_hint(.hint))]
    InvalidValue { field: String, hint: Option<String> },

    #[error("output directories overlap: server `{}` and client `{}` ({reason})", .server.display(), .client.display())]
    OverlappingOutputDirs {
        server: PathBuf,
        client: PathBuf,
        reason: String,
    },

    #[error("schema validation failed: {message}{}", format_hint(.hint))]
    SchemaValidation {
        message: String,
        hint: Option<String>,
    },

    #[error("config not found in {}", .0.display())]
    NotFound(PathBuf),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, hint: impl Into<String>) -> Self {
        ConfigError::InvalidValue {
            field: field.into(),
            hint: Some(hint.into()),
        }
    }

    /// Name of the configuration field this error is about, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::MissingField { field } | ConfigError::InvalidValue { field, .. } => {
                Some(field)
            }
            ConfigError::OverlappingOutputDirs { .. } => Some("out_dir"),
            _ => None,
        }
    }
}

fn format_hint(hint: &Option<String>) -> String {
    match hint {
        Some(hint) => format!(": {hint}"),
        None => String::new(),
    }
}
