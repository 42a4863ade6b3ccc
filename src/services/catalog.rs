// INFORMATION_SCHEMA listings: schemas, tables, files, views
use serde_json::Value;

use crate::error::ClientError;
use crate::services::classifier::{PluginDescriptor, PluginFamily};
use crate::services::engine::QueryEngine;

/// Marker suffix the engine appends to view files on disk.
const VIEW_SUFFIX: &str = "view.drill";

/// Schema names under a plugin via `SHOW DATABASES`, optionally with the
/// `plugin.` prefix stripped.
pub async fn schema_names<E: QueryEngine + ?Sized>(
    engine: &E,
    plugin: &str,
    strip_plugin: bool,
) -> Result<Vec<String>, ClientError> {
    let sql = format!(
        "SHOW DATABASES WHERE `SCHEMA_NAME` LIKE '{}.%' ESCAPE '\\'",
        escape_like(plugin)
    );
    let result = engine.execute_query(&sql).await?;

    let prefix = format!("{}.", plugin);
    Ok(result
        .rows()
        .iter()
        .filter_map(|row| row.get("SCHEMA_NAME").and_then(Value::as_str))
        .map(|schema| {
            if strip_plugin {
                schema.strip_prefix(&prefix).unwrap_or(schema).to_string()
            } else {
                schema.to_string()
            }
        })
        .collect())
}

/// Table names in a schema. For file plugins this lists plain files in the
/// workspace; for everything else it consults `INFORMATION_SCHEMA.TABLES`.
/// A `None` schema means the plugin's default database.
pub async fn table_names<E: QueryEngine + ?Sized>(
    engine: &E,
    descriptor: &PluginDescriptor,
    schema: Option<&str>,
) -> Result<Vec<String>, ClientError> {
    let qualified = qualified_schema(&descriptor.name, schema);

    if descriptor.family == PluginFamily::File {
        let sql = format!(
            "SELECT `FILE_NAME` FROM `INFORMATION_SCHEMA`.`files` WHERE `SCHEMA_NAME` = '{}' AND `IS_FILE` = true",
            escape_literal(&qualified)
        );
        let result = engine.execute_query(&sql).await?;
        // Views live in the same directory; list those separately
        return Ok(result
            .rows()
            .iter()
            .filter_map(|row| row.get("FILE_NAME").and_then(Value::as_str))
            .filter(|name| !name.contains(VIEW_SUFFIX))
            .map(str::to_string)
            .collect());
    }

    let sql = format!(
        "SELECT `TABLE_NAME` FROM `INFORMATION_SCHEMA`.`TABLES` WHERE `TABLE_SCHEMA` = '{}'",
        escape_literal(&qualified)
    );
    let result = engine.execute_query(&sql).await?;
    Ok(result
        .rows()
        .iter()
        .filter_map(|row| row.get("TABLE_NAME").and_then(Value::as_str))
        .map(|name| name.replace(VIEW_SUFFIX, ""))
        .collect())
}

/// View names in a schema, from the engine's view catalog.
pub async fn view_names<E: QueryEngine + ?Sized>(
    engine: &E,
    plugin: &str,
    schema: Option<&str>,
) -> Result<Vec<String>, ClientError> {
    let qualified = qualified_schema(plugin, schema);
    let sql = format!(
        "SELECT `TABLE_NAME` FROM INFORMATION_SCHEMA.views WHERE `table_schema` = '{}'",
        escape_literal(&qualified)
    );
    let result = engine.execute_query(&sql).await?;
    Ok(result
        .rows()
        .iter()
        .filter_map(|row| row.get("TABLE_NAME").and_then(Value::as_str))
        .map(str::to_string)
        .collect())
}

fn qualified_schema(plugin: &str, schema: Option<&str>) -> String {
    match schema {
        Some(schema) => format!("{}.{}", plugin, schema),
        None => plugin.to_string(),
    }
}

/// Escapes a string literal for single-quoted SQL.
pub(crate) fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Escapes a LIKE pattern operand for use with `ESCAPE '\'`.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' | '%' | '_' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\'' => escaped.push_str("''"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::{file_plugin, jdbc_plugin, single_column_result, MockEngine};
    use crate::services::classifier::classify;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("plain"), "plain");
        assert_eq!(escape_like("odd_name"), "odd\\_name");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("it's"), "it''s");
    }

    #[tokio::test]
    async fn test_schema_names_strips_plugin_prefix() {
        let engine = MockEngine::new().on_query(
            "SHOW DATABASES WHERE `SCHEMA_NAME` LIKE 'pg.%' ESCAPE '\\'",
            single_column_result("SCHEMA_NAME", &["pg.public", "pg.sales"]),
        );

        let names = schema_names(&engine, "pg", true).await.unwrap();
        assert_eq!(names, vec!["public", "sales"]);

        let raw = schema_names(&engine, "pg", false).await.unwrap();
        assert_eq!(raw, vec!["pg.public", "pg.sales"]);
    }

    #[tokio::test]
    async fn test_table_names_strips_view_marker() {
        let descriptor = classify(&jdbc_plugin("pg", None));
        let engine = MockEngine::new().on_query(
            "SELECT `TABLE_NAME` FROM `INFORMATION_SCHEMA`.`TABLES` WHERE `TABLE_SCHEMA` = 'pg.public'",
            single_column_result("TABLE_NAME", &["users", "ordersview.drill"]),
        );

        let names = table_names(&engine, &descriptor, Some("public")).await.unwrap();
        assert_eq!(names, vec!["users", "orders"]);
    }

    #[tokio::test]
    async fn test_file_table_names_skip_views() {
        let descriptor = classify(&file_plugin("dfs", &["tmp"]));
        let engine = MockEngine::new().on_query(
            "SELECT `FILE_NAME` FROM `INFORMATION_SCHEMA`.`files` WHERE `SCHEMA_NAME` = 'dfs.tmp' AND `IS_FILE` = true",
            single_column_result("FILE_NAME", &["data.csv", "report.view.drill"]),
        );

        let names = table_names(&engine, &descriptor, Some("tmp")).await.unwrap();
        assert_eq!(names, vec!["data.csv"]);
    }

    #[tokio::test]
    async fn test_default_database_omits_schema_component() {
        let descriptor = classify(&jdbc_plugin("pg", None));
        let engine = MockEngine::new().on_query(
            "SELECT `TABLE_NAME` FROM `INFORMATION_SCHEMA`.`TABLES` WHERE `TABLE_SCHEMA` = 'pg'",
            single_column_result("TABLE_NAME", &["users"]),
        );

        let names = table_names(&engine, &descriptor, None).await.unwrap();
        assert_eq!(names, vec!["users"]);
    }
}
