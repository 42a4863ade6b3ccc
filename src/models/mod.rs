pub mod node;
pub mod plugin;
pub mod result;

pub use node::{ColumnNode, ResolvedNode, SchemaNode, TableNode};
pub use plugin::{PluginConfig, StoragePlugin, WorkspaceConfig};
pub use result::{clean_data_type_name, QueryResult, ResultField};
