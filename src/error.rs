use thiserror::Error;

/// Errors surfaced by the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The engine returned an error payload for a submitted query. The
    /// offending statement is always attached.
    #[error("Query error: {message} (query: {query})")]
    Query { message: String, query: String },

    #[error("Unable to resolve storage plugin: {0}")]
    UnresolvedPlugin(String),

    /// The caller supplied more path segments than any plugin family can
    /// interpret. Not retryable.
    #[error("Path depth {depth} exceeds the deepest resolvable level")]
    PathDepth { depth: i64 },

    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
