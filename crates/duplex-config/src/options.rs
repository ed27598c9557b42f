//! Partial, user-supplied options.
//!
//! Every field is optional except `server_entry`, which is checked when the
//! options are resolved. Unset fields are omitted when serialized so that the
//! merge in [`crate::resolve`] only overrides what the user actually wrote.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::{BuildMode, ExternalOption, MinifyOption, OutputFormat};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<BuildMode>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_entry: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_config: Option<PartialServerConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_entry: Option<IndexMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_config: Option<PartialClientConfig>,
}

impl UserOptions {
    pub fn new(server_entry: impl Into<String>) -> Self {
        Self {
            server_entry: Some(server_entry.into()),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialOutputNaming {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<OutputFormat>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_file_names: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_file_names: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_file_names: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialServerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub no_external: Option<ExternalOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PartialOutputNaming>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify: Option<MinifyOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_out_dir: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub define: Option<IndexMap<String, Value>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PartialClientConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external: Option<ExternalOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PartialOutputNaming>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minify: Option<MinifyOption>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub empty_out_dir: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_dir: Option<PathBuf>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub define: Option<IndexMap<String, Value>>,
}
