// Abstraction over the query engine's REST surface
use crate::error::ClientError;
use crate::models::{QueryResult, StoragePlugin};

/// The two operations the schema-browsing services need from the engine.
///
/// Implemented by [`crate::DrillClient`]; resolver tests implement it with
/// canned responses.
#[async_trait::async_trait]
pub trait QueryEngine: Send + Sync {
    /// Execute a SQL statement and return its result set.
    async fn execute_query(&self, sql: &str) -> Result<QueryResult, ClientError>;

    /// Fetch the configuration of a named, enabled storage plugin.
    async fn plugin_config(&self, plugin: &str) -> Result<StoragePlugin, ClientError>;
}
