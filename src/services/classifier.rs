// Storage plugin classification: family, JDBC dialect, workspace set
use std::collections::HashSet;

use crate::models::StoragePlugin;

/// Plugin family, decided once per resolution from the declared plugin type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginFamily {
    /// Hierarchical file stores (workspaces, directories, files).
    File,
    /// JDBC-fronted relational databases. Also the catch-all for declared
    /// types with no dedicated family, which browse like relational sources.
    Jdbc,
    /// Document stores (mongo-like).
    Document,
    /// Search/log indices (elastic/splunk-like).
    Search,
}

impl PluginFamily {
    pub fn from_type(plugin_type: &str) -> Self {
        match plugin_type.to_lowercase().as_str() {
            "file" => PluginFamily::File,
            "mongo" => PluginFamily::Document,
            "elastic" | "splunk" => PluginFamily::Search,
            _ => PluginFamily::Jdbc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginFamily::File => "file",
            PluginFamily::Jdbc => "jdbc",
            PluginFamily::Document => "document",
            PluginFamily::Search => "search",
        }
    }
}

/// Everything the resolvers need to know about a plugin. Immutable per
/// resolution call.
#[derive(Debug, Clone)]
pub struct PluginDescriptor {
    pub name: String,
    pub family: PluginFamily,
    /// Driver token from the JDBC connection URL; `None` when absent or
    /// unparseable (callers fall back to offset 0).
    pub dialect: Option<String>,
    /// Declared workspace names of a file plugin. A leading path segment
    /// matching one of these is one tree level, not part of a directory
    /// string.
    pub workspaces: HashSet<String>,
}

pub fn classify(plugin: &StoragePlugin) -> PluginDescriptor {
    let family = PluginFamily::from_type(&plugin.config.plugin_type);

    let dialect = match family {
        PluginFamily::Jdbc => plugin.config.url.as_deref().and_then(jdbc_dialect),
        _ => None,
    };

    let workspaces = plugin
        .config
        .workspaces
        .as_ref()
        .map(|w| w.keys().cloned().collect())
        .unwrap_or_default();

    PluginDescriptor {
        name: plugin.name.clone(),
        family,
        dialect,
        workspaces,
    }
}

/// Extracts the driver token between `jdbc:` and the next `:` from a JDBC
/// connection URL. JDBC URLs are not RFC URLs, so this is a plain scan.
fn jdbc_dialect(url: &str) -> Option<String> {
    let rest = url.strip_prefix("jdbc:")?;
    let end = rest.find(':')?;
    let token = &rest[..end];
    if token.is_empty() || !token.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(token.to_lowercase())
}

/// How many leading path segments fold into one semantic "database" level
/// for each known JDBC dialect. Additive: new dialects get a row here.
const DIALECT_OFFSETS: &[(&str, i64)] = &[
    ("bigquery", 1),
    ("snowflake", 1),
    ("postgresql", -1),
    ("postgres", -1),
    ("sqlserver", -1),
];

pub fn dialect_offset(dialect: Option<&str>) -> i64 {
    dialect
        .and_then(|d| {
            DIALECT_OFFSETS
                .iter()
                .find(|(name, _)| *name == d)
                .map(|(_, offset)| *offset)
        })
        .unwrap_or(0)
}
