// Dialect-aware resolution for relational, document, and search plugins
use tracing::debug;

use crate::error::ClientError;
use crate::models::{ResolvedNode, SchemaNode, TableNode};
use crate::services::catalog;
use crate::services::classifier::{dialect_offset, PluginDescriptor};
use crate::services::engine::QueryEngine;
use crate::services::introspect;

/// Resolves path segments against a (database, table) hierarchy.
///
/// The dialect offset adjusts how many leading segments fold into one
/// semantic "database" level: effective depth = segment count - offset.
pub(crate) async fn resolve_relational<E: QueryEngine + ?Sized>(
    engine: &E,
    descriptor: &PluginDescriptor,
    segments: &[String],
) -> Result<Vec<ResolvedNode>, ClientError> {
    let offset = dialect_offset(descriptor.dialect.as_deref());
    let depth = segments.len() as i64 - offset;
    debug!(
        plugin = %descriptor.name,
        dialect = descriptor.dialect.as_deref().unwrap_or("unknown"),
        depth,
        "resolving relational path"
    );

    if depth < 1 {
        // Negative depth (negative-offset dialects on very short paths) is
        // treated the same as zero. To be confirmed against a real backend.
        let names = catalog::schema_names(engine, &descriptor.name, true).await?;
        return Ok(names
            .into_iter()
            .map(|name| {
                ResolvedNode::Schema(SchemaNode {
                    plugin: descriptor.name.clone(),
                    name,
                })
            })
            .collect());
    }

    if depth == 1 {
        let database = join_segments(segments);
        let names = catalog::table_names(engine, descriptor, database.as_deref()).await?;
        let schema_label = database.unwrap_or_else(|| descriptor.name.clone());
        return Ok(names
            .into_iter()
            .map(|name| {
                ResolvedNode::Table(TableNode {
                    schema: schema_label.clone(),
                    name,
                })
            })
            .collect());
    }

    if depth == 2 {
        if let Some((table, rest)) = segments.split_last() {
            let database = join_segments(rest);
            return introspect::columns(engine, descriptor, database.as_deref(), table).await;
        }
    }

    Err(ClientError::PathDepth { depth })
}

/// An empty segment list means the plugin's default database, not an empty
/// name.
fn join_segments(segments: &[String]) -> Option<String> {
    if segments.is_empty() {
        None
    } else {
        Some(segments.join("."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::classifier::classify;
    use crate::services::testing::{
        jdbc_plugin, probe_result, rows_result, single_column_result, MockEngine,
    };
    use serde_json::json;

    fn segments(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_zero_segments_unknown_dialect_lists_schemas() {
        let descriptor = classify(&jdbc_plugin("mydb", Some("not a jdbc url")));
        assert!(descriptor.dialect.is_none());

        let engine = MockEngine::new().on_query(
            "SHOW DATABASES WHERE `SCHEMA_NAME` LIKE 'mydb.%' ESCAPE '\\'",
            single_column_result("SCHEMA_NAME", &["mydb.sales", "mydb.hr"]),
        );

        let nodes = resolve_relational(&engine, &descriptor, &[]).await.unwrap();
        assert_eq!(
            nodes,
            vec![
                ResolvedNode::Schema(SchemaNode {
                    plugin: "mydb".to_string(),
                    name: "sales".to_string()
                }),
                ResolvedNode::Schema(SchemaNode {
                    plugin: "mydb".to_string(),
                    name: "hr".to_string()
                }),
            ]
        );
    }

    #[tokio::test]
    async fn test_one_segment_lists_tables() {
        let descriptor = classify(&jdbc_plugin("mydb", None));
        let engine = MockEngine::new().on_query(
            "SELECT `TABLE_NAME` FROM `INFORMATION_SCHEMA`.`TABLES` WHERE `TABLE_SCHEMA` = 'mydb.sales'",
            single_column_result("TABLE_NAME", &["orders"]),
        );

        let nodes = resolve_relational(&engine, &descriptor, &segments(&["sales"]))
            .await
            .unwrap();
        assert_eq!(
            nodes,
            vec![ResolvedNode::Table(TableNode {
                schema: "sales".to_string(),
                name: "orders".to_string()
            })]
        );
    }

    #[tokio::test]
    async fn test_bigquery_three_segments_resolve_to_columns() {
        // Offset +1: project + dataset fold into the database level
        let descriptor = classify(&jdbc_plugin(
            "bq",
            Some("jdbc:bigquery://https://www.googleapis.com/bigquery/v2:443;ProjectId=p"),
        ));

        let engine = MockEngine::new().on_query(
            "DESCRIBE `bq`.`project`.`dataset`.`events`",
            rows_result(vec![
                json!({"COLUMN_NAME": "ts", "DATA_TYPE": "TIMESTAMP", "IS_NULLABLE": "NO"}),
            ]),
        );

        let nodes = resolve_relational(&engine, &descriptor, &segments(&["project", "dataset", "events"]))
            .await
            .unwrap();
        assert_eq!(nodes.len(), 1);
        let ResolvedNode::Column(column) = &nodes[0] else {
            panic!("expected column");
        };
        assert_eq!(column.schema.as_deref(), Some("project.dataset"));
        assert_eq!(column.table, "events");
    }

    #[tokio::test]
    async fn test_bigquery_two_segments_list_tables_of_dataset() {
        let descriptor = classify(&jdbc_plugin(
            "bq",
            Some("jdbc:bigquery://https://host:443;ProjectId=p"),
        ));
        let engine = MockEngine::new().on_query(
            "SELECT `TABLE_NAME` FROM `INFORMATION_SCHEMA`.`TABLES` WHERE `TABLE_SCHEMA` = 'bq.project.dataset'",
            single_column_result("TABLE_NAME", &["events"]),
        );

        let nodes = resolve_relational(&engine, &descriptor, &segments(&["project", "dataset"]))
            .await
            .unwrap();
        assert_eq!(nodes.len(), 1);
    }

    #[tokio::test]
    async fn test_negative_offset_single_segment_is_table_in_default_database() {
        let descriptor = classify(&jdbc_plugin("pg", Some("jdbc:postgresql://h:5432/db")));

        let engine = MockEngine::new().on_query(
            "DESCRIBE `pg`.`users`",
            rows_result(vec![
                json!({"COLUMN_NAME": "id", "DATA_TYPE": "INTEGER", "IS_NULLABLE": "NO"}),
            ]),
        );

        let nodes = resolve_relational(&engine, &descriptor, &segments(&["users"]))
            .await
            .unwrap();
        let ResolvedNode::Column(column) = &nodes[0] else {
            panic!("expected column");
        };
        // Default database: no schema component, not an empty one
        assert_eq!(column.schema, None);
    }

    #[tokio::test]
    async fn test_negative_offset_zero_segments_list_default_tables() {
        let descriptor = classify(&jdbc_plugin("pg", Some("jdbc:postgresql://h:5432/db")));
        let engine = MockEngine::new().on_query(
            "SELECT `TABLE_NAME` FROM `INFORMATION_SCHEMA`.`TABLES` WHERE `TABLE_SCHEMA` = 'pg'",
            single_column_result("TABLE_NAME", &["users", "orders"]),
        );

        let nodes = resolve_relational(&engine, &descriptor, &[]).await.unwrap();
        assert_eq!(nodes.len(), 2);
    }

    #[tokio::test]
    async fn test_excess_depth_is_an_error() {
        let descriptor = classify(&jdbc_plugin("mydb", None));
        let err = resolve_relational(&engine_with_nothing(), &descriptor, &segments(&["a", "b", "c"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::PathDepth { depth: 3 }));
    }

    #[tokio::test]
    async fn test_subquery_table_name_passes_through() {
        let descriptor = classify(&jdbc_plugin("mydb", None));
        let engine = MockEngine::new().on_query(
            "SELECT * FROM (SELECT 1 AS n) LIMIT 1",
            probe_result(&[("n", "INT")]),
        );

        let nodes = resolve_relational(&engine, &descriptor, &segments(&["sales", "SELECT 1 AS n"]))
            .await
            .unwrap();
        assert_eq!(nodes.len(), 1);
    }

    fn engine_with_nothing() -> MockEngine {
        MockEngine::new()
    }
}
