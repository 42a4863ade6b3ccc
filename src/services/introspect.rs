// Column discovery for fully resolved tables, files, views, and nested fields
//
// Schema discovery behaves differently per plugin family. Files, document
// stores, and search indices have no catalog to consult, so columns come from
// probing with `SELECT * ... LIMIT 1`. Relational backends answer `DESCRIBE`.
use serde_json::Value;
use tracing::warn;

use crate::error::ClientError;
use crate::models::{ColumnNode, QueryResult, ResolvedNode};
use crate::services::catalog;
use crate::services::classifier::{PluginDescriptor, PluginFamily};
use crate::services::engine::QueryEngine;
use crate::services::quoting::format_drill_table;

/// Columns of a table (or file, collection, index) addressed as
/// `plugin[.schema].table`. `None` schema means the plugin's default
/// database.
pub async fn columns<E: QueryEngine + ?Sized>(
    engine: &E,
    descriptor: &PluginDescriptor,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<ResolvedNode>, ClientError> {
    let path = match schema {
        Some(schema) => format!("{}.{}.{}", descriptor.name, schema, table),
        None => format!("{}.{}", descriptor.name, table),
    };

    match descriptor.family {
        PluginFamily::File | PluginFamily::Document | PluginFamily::Search => {
            let views = catalog::view_names(engine, &descriptor.name, schema).await?;
            let sql = if views.iter().any(|view| view == table) {
                // Views resolve against the schema path, not the physical one
                let schema_path = match schema {
                    Some(schema) => format!("{}.{}", descriptor.name, schema),
                    None => descriptor.name.clone(),
                };
                format!("SELECT * FROM `{}`.`{}` LIMIT 1", schema_path, table)
            } else {
                format!("SELECT * FROM {} LIMIT 1", format_drill_table(descriptor, &path))
            };
            let result = engine.execute_query(&sql).await?;
            Ok(result_columns(descriptor, schema, table, &result))
        }
        PluginFamily::Jdbc => {
            if table.contains("SELECT") {
                // Ad-hoc subquery escape hatch: the "table" is a raw query
                let sql = format!("SELECT * FROM ({}) LIMIT 1", table);
                let result = engine.execute_query(&sql).await?;
                Ok(result_columns(descriptor, schema, table, &result))
            } else {
                let sql = format!("DESCRIBE {}", format_drill_table(descriptor, &path));
                let result = engine.execute_query(&sql).await?;
                Ok(describe_columns(descriptor, schema, table, &result))
            }
        }
    }
}

/// Columns of a single file addressed by an already-quoted path.
pub async fn file_columns<E: QueryEngine + ?Sized>(
    engine: &E,
    descriptor: &PluginDescriptor,
    quoted_path: &str,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<ResolvedNode>, ClientError> {
    let sql = format!("SELECT * FROM {} LIMIT 1", quoted_path);
    let result = engine.execute_query(&sql).await?;
    Ok(result_columns(descriptor, schema, table, &result))
}

/// Expands a nested map field inside a file through the engine-side
/// `getMapSchema` function.
///
/// Best-effort: a backend failure is logged and degrades to an empty list
/// instead of failing the resolution.
pub async fn map_schema<E: QueryEngine + ?Sized>(
    engine: &E,
    quoted_path: &str,
    quoted_field: &str,
) -> Vec<(String, String)> {
    let sql = format!(
        "SELECT getMapSchema(t.{}) AS map_schema FROM {} AS t LIMIT 1",
        quoted_field, quoted_path
    );

    let result = match engine.execute_query(&sql).await {
        Ok(result) => result,
        Err(err) => {
            warn!(field = quoted_field, error = %err, "map schema expansion failed");
            return Vec::new();
        }
    };

    let Some(Value::Object(entries)) = result.first().and_then(|row| row.get("map_schema")) else {
        return Vec::new();
    };

    entries
        .iter()
        .map(|(name, data_type)| {
            let data_type = match data_type {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (name.clone(), data_type)
        })
        .collect()
}

/// Sheet names of a spreadsheet file, from the reader's `_sheets` implicit
/// column.
pub async fn excel_sheet_names<E: QueryEngine + ?Sized>(
    engine: &E,
    quoted_path: &str,
) -> Result<Vec<String>, ClientError> {
    let sql = format!("SELECT _sheets FROM {} LIMIT 1", quoted_path);
    let result = engine.execute_query(&sql).await?;

    let Some(Value::Array(sheets)) = result.first().and_then(|row| row.get("_sheets")) else {
        return Ok(Vec::new());
    };

    Ok(sheets
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect())
}

/// Columns of one sheet of a spreadsheet file.
pub async fn excel_sheet_columns<E: QueryEngine + ?Sized>(
    engine: &E,
    descriptor: &PluginDescriptor,
    quoted_path: &str,
    sheet: &str,
    schema: Option<&str>,
    table: &str,
) -> Result<Vec<ResolvedNode>, ClientError> {
    let sql = format!(
        "SELECT * FROM table({}(type => 'excel', sheetName => '{}')) LIMIT 1",
        quoted_path,
        catalog::escape_literal(sheet)
    );
    let result = engine.execute_query(&sql).await?;
    Ok(result_columns(descriptor, schema, table, &result))
}

/// Builds column nodes from a probe result's columns/metadata arrays.
/// Nullability is unknown for probed sources and reported as false.
fn result_columns(
    descriptor: &PluginDescriptor,
    schema: Option<&str>,
    table: &str,
    result: &QueryResult,
) -> Vec<ResolvedNode> {
    result
        .schema()
        .into_iter()
        .map(|field| {
            ResolvedNode::Column(ColumnNode {
                plugin: descriptor.name.clone(),
                schema: schema.map(str::to_string),
                table: table.to_string(),
                name: field.name,
                data_type: field.data_type,
                is_nullable: false,
            })
        })
        .collect()
}

/// Maps `DESCRIBE` rows (COLUMN_NAME / DATA_TYPE / IS_NULLABLE).
fn describe_columns(
    descriptor: &PluginDescriptor,
    schema: Option<&str>,
    table: &str,
    result: &QueryResult,
) -> Vec<ResolvedNode> {
    result
        .rows()
        .iter()
        .filter_map(|row| {
            let name = row.get("COLUMN_NAME")?.as_str()?.to_string();
            let data_type = row
                .get("DATA_TYPE")
                .and_then(Value::as_str)
                .map(crate::models::clean_data_type_name)
                .unwrap_or_default();
            Some(ResolvedNode::Column(ColumnNode {
                plugin: descriptor.name.clone(),
                schema: schema.map(str::to_string),
                table: table.to_string(),
                name,
                data_type,
                is_nullable: is_nullable(row.get("IS_NULLABLE")),
            }))
        })
        .collect()
}

/// Nullable only on boolean true or the literal string "YES".
fn is_nullable(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => s == "YES",
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::classifier::classify;
    use crate::services::testing::{
        empty_result, file_plugin, jdbc_plugin, mongo_plugin, probe_result, rows_result,
        single_column_result, MockEngine,
    };
    use serde_json::json;

    fn column_names(nodes: &[ResolvedNode]) -> Vec<String> {
        nodes
            .iter()
            .map(|node| match node {
                ResolvedNode::Column(c) => c.name.clone(),
                other => panic!("expected column node, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_is_nullable() {
        assert!(is_nullable(Some(&json!(true))));
        assert!(is_nullable(Some(&json!("YES"))));
        assert!(!is_nullable(Some(&json!("NO"))));
        assert!(!is_nullable(Some(&json!("yes"))));
        assert!(!is_nullable(Some(&json!(1))));
        assert!(!is_nullable(None));
    }

    #[tokio::test]
    async fn test_relational_columns_via_describe() {
        let descriptor = classify(&jdbc_plugin("pg", Some("jdbc:postgresql://h/db")));
        let engine = MockEngine::new().on_query(
            "DESCRIBE `pg`.`public`.`users`",
            rows_result(vec![
                json!({"COLUMN_NAME": "id", "DATA_TYPE": "BIGINT", "IS_NULLABLE": "NO"}),
                json!({"COLUMN_NAME": "email", "DATA_TYPE": "CHARACTER VARYING(255)", "IS_NULLABLE": "YES"}),
            ]),
        );

        let nodes = columns(&engine, &descriptor, Some("public"), "users")
            .await
            .unwrap();
        assert_eq!(column_names(&nodes), vec!["id", "email"]);

        let ResolvedNode::Column(email) = &nodes[1] else {
            panic!();
        };
        assert!(email.is_nullable);
        assert_eq!(email.data_type, "CHARACTER VARYING(255)");

        let ResolvedNode::Column(id) = &nodes[0] else {
            panic!();
        };
        assert!(!id.is_nullable);
        assert_eq!(id.schema.as_deref(), Some("public"));
    }

    #[tokio::test]
    async fn test_subquery_escape_hatch_probes_result_schema() {
        let descriptor = classify(&jdbc_plugin("pg", None));
        let engine = MockEngine::new().on_query(
            "SELECT * FROM (SELECT 1 AS n) LIMIT 1",
            probe_result(&[("n", "INT")]),
        );

        let nodes = columns(&engine, &descriptor, None, "SELECT 1 AS n")
            .await
            .unwrap();
        assert_eq!(column_names(&nodes), vec!["n"]);
    }

    #[tokio::test]
    async fn test_file_columns_prefer_view_catalog() {
        let descriptor = classify(&file_plugin("dfs", &["tmp"]));
        let engine = MockEngine::new()
            .on_query(
                "SELECT `TABLE_NAME` FROM INFORMATION_SCHEMA.views WHERE `table_schema` = 'dfs.tmp'",
                single_column_result("TABLE_NAME", &["orders"]),
            )
            .on_query(
                "SELECT * FROM `dfs.tmp`.`orders` LIMIT 1",
                probe_result(&[("id", "BIGINT"), ("total", "DECIMAL(12,2)")]),
            );

        let nodes = columns(&engine, &descriptor, Some("tmp"), "orders")
            .await
            .unwrap();
        assert_eq!(column_names(&nodes), vec!["id", "total"]);

        let ResolvedNode::Column(total) = &nodes[1] else {
            panic!();
        };
        assert_eq!(total.data_type, "DECIMAL");
    }

    #[tokio::test]
    async fn test_document_columns_via_probe() {
        let descriptor = classify(&mongo_plugin("mongo"));
        let engine = MockEngine::new()
            .on_query(
                "SELECT `TABLE_NAME` FROM INFORMATION_SCHEMA.views WHERE `table_schema` = 'mongo.app'",
                empty_result(),
            )
            .on_query(
                "SELECT * FROM `mongo`.`app`.`events` LIMIT 1",
                probe_result(&[("_id", "VARCHAR"), ("payload", "MAP")]),
            );

        let nodes = columns(&engine, &descriptor, Some("app"), "events")
            .await
            .unwrap();
        assert_eq!(column_names(&nodes), vec!["_id", "payload"]);
    }

    #[tokio::test]
    async fn test_map_schema_degrades_to_empty_on_backend_error() {
        let engine = MockEngine::new();
        // No canned response: the probe errors, expansion swallows it
        let pairs = map_schema(&engine, "`dfs`.`tmp`.`data.json`", "`payload`").await;
        assert!(pairs.is_empty());
    }

    #[tokio::test]
    async fn test_map_schema_returns_field_pairs() {
        let engine = MockEngine::new().on_query(
            "SELECT getMapSchema(t.`payload`) AS map_schema FROM `dfs`.`tmp`.`data.json` AS t LIMIT 1",
            rows_result(vec![json!({"map_schema": {"city": "VARCHAR", "zip": "INT"}})]),
        );

        let pairs = map_schema(&engine, "`dfs`.`tmp`.`data.json`", "`payload`").await;
        assert_eq!(pairs.len(), 2);
        assert!(pairs.contains(&("city".to_string(), "VARCHAR".to_string())));
        assert!(pairs.contains(&("zip".to_string(), "INT".to_string())));
    }

    #[tokio::test]
    async fn test_excel_sheet_names() {
        let engine = MockEngine::new().on_query(
            "SELECT _sheets FROM `dfs`.`tmp`.`book.xlsx` LIMIT 1",
            rows_result(vec![json!({"_sheets": ["Summary", "Raw Data"]})]),
        );

        let sheets = excel_sheet_names(&engine, "`dfs`.`tmp`.`book.xlsx`")
            .await
            .unwrap();
        assert_eq!(sheets, vec!["Summary", "Raw Data"]);
    }
}
