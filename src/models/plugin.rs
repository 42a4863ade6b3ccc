use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// A storage plugin as exposed by the engine's `/storage` endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoragePlugin {
    pub name: String,
    pub config: PluginConfig,
}

/// Storage plugin configuration.
///
/// Only the fields the client interprets are modeled; everything else a
/// backend-specific config carries (connection strings, format maps,
/// credentials) is kept in `extra` so a fetched config can be written back
/// unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    #[serde(rename = "type")]
    pub plugin_type: String,

    /// JDBC connection URL, present on jdbc plugins only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(default)]
    pub enabled: bool,

    /// Named workspaces, present on file plugins only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspaces: Option<HashMap<String, WorkspaceConfig>>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    #[serde(default)]
    pub location: String,

    #[serde(default)]
    pub writable: bool,

    #[serde(
        rename = "defaultInputFormat",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub default_input_format: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl StoragePlugin {
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}
