use serde::Serialize;

/// Body of a `POST /query.json` request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    query_type: String,
    query: String,
    auto_limit: usize,
}

impl QueryRequest {
    pub fn sql(query: impl Into<String>, auto_limit: usize) -> Self {
        Self {
            query_type: "SQL".to_string(),
            query: query.into(),
            auto_limit,
        }
    }
}
