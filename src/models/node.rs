use serde::{Deserialize, Serialize};

/// One entry in a resolved schema-tree listing.
///
/// Ordering of returned nodes matches the order produced by the underlying
/// query; callers must not assume alphabetical order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResolvedNode {
    Schema(SchemaNode),
    Table(TableNode),
    Column(ColumnNode),
}

/// A schema (workspace or database) under a storage plugin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaNode {
    pub plugin: String,
    pub name: String,
}

/// A table, file, directory entry, or spreadsheet tab under a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableNode {
    pub schema: String,
    pub name: String,
}

/// A column of a fully resolved table, file, view, or nested field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnNode {
    pub plugin: String,
    /// Absent when the table lives in the plugin's default database.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub table: String,
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
}
