use serde_json::{Map, Value};

use crate::client::response::QueryResponse;

/// The outcome of one successfully executed query.
#[derive(Debug, Clone)]
pub struct QueryResult {
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
    metadata: Vec<String>,
    query: String,
}

/// A column name paired with its cleaned data type, derived from the
/// response's columns/metadata arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultField {
    pub name: String,
    pub data_type: String,
}

impl QueryResult {
    pub fn new(
        columns: Vec<String>,
        rows: Vec<Map<String, Value>>,
        metadata: Vec<String>,
        query: impl Into<String>,
    ) -> Self {
        Self {
            columns,
            rows,
            metadata,
            query: query.into(),
        }
    }

    pub(crate) fn from_response(response: QueryResponse, query: &str) -> Self {
        Self::new(response.columns, response.rows, response.metadata, query)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    pub fn metadata(&self) -> &[String] {
        &self.metadata
    }

    /// The statement that produced this result.
    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn first(&self) -> Option<&Map<String, Value>> {
        self.rows.first()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn field_count(&self) -> usize {
        self.columns.len()
    }

    /// Pairs each column with its cleaned type name. Columns past the end of
    /// the metadata array fall back to an empty type.
    pub fn schema(&self) -> Vec<ResultField> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, name)| ResultField {
                name: name.clone(),
                data_type: self
                    .metadata
                    .get(i)
                    .map(|m| clean_data_type_name(m))
                    .unwrap_or_default(),
            })
            .collect()
    }
}

/// Strips precision/scale from type names: `DECIMAL(3, 4)` → `DECIMAL`,
/// `CHAR(30)` → `CHAR`. Types without a parenthesized precision pass through
/// unchanged.
pub fn clean_data_type_name(data_type: &str) -> String {
    if let Some(open) = data_type.find('(') {
        let name = &data_type[..open];
        let args = &data_type[open + 1..];
        let precision_args = args.strip_suffix(')').map(|inner| {
            !inner.is_empty()
                && inner.split(',').all(|part| {
                    let part = part.trim();
                    !part.is_empty() && part.chars().all(|c| c.is_ascii_digit())
                })
        });
        if precision_args == Some(true)
            && !name.is_empty()
            && name.chars().all(|c| c.is_ascii_alphabetic())
        {
            return name.to_string();
        }
    }
    data_type.to_string()
}
