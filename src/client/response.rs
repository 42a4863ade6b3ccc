use serde::Deserialize;
use serde_json::{Map, Value};

/// Body of a `/query.json` response. Error responses reuse the same shape
/// with `errorMessage`/`stackTrace` set and the data arrays absent.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    #[serde(default)]
    pub query_id: Option<String>,

    #[serde(default)]
    pub columns: Vec<String>,

    #[serde(default)]
    pub rows: Vec<Map<String, Value>>,

    /// Per-column type names, parallel to `columns`.
    #[serde(default)]
    pub metadata: Vec<String>,

    #[serde(default)]
    pub query_state: Option<String>,

    #[serde(default)]
    pub error_message: Option<String>,

    #[serde(default)]
    pub stack_trace: Option<Vec<String>>,
}

/// Mutation acknowledgement returned by the storage endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationResponse {
    #[serde(default)]
    pub result: Option<String>,

    #[serde(default)]
    pub error_message: Option<String>,
}

impl ConfirmationResponse {
    pub fn is_success(&self) -> bool {
        self.error_message.is_none()
            && self
                .result
                .as_deref()
                .is_some_and(|r| r.eq_ignore_ascii_case("success"))
    }
}
