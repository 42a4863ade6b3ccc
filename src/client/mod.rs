// REST client for Drill-compatible query engines
pub mod request;
pub mod response;

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::config::DrillConfig;
use crate::error::ClientError;
use crate::models::{QueryResult, ResolvedNode, StoragePlugin, TableNode};
use crate::services::engine::QueryEngine;
use crate::services::{catalog, classifier, introspect, resolver};

use request::QueryRequest;
use response::{ConfirmationResponse, QueryResponse};

/// Async client for a query engine's REST API.
///
/// Covers query execution (`/query.json`), storage plugin management
/// (`/storage`), and schema-tree browsing via [`DrillClient::resolve`].
pub struct DrillClient {
    base_url: String,
    http: reqwest::Client,
    username: Option<String>,
    password: Option<String>,
    row_limit: usize,
    timeout_secs: u64,
    plugin_cache: Mutex<HashMap<String, CachedPlugin>>,
}

struct CachedPlugin {
    plugin: StoragePlugin,
    fetched_at: DateTime<Utc>,
}

enum Endpoint<'a> {
    Query,
    Storage,
    PluginInfo(&'a str),
    PluginEnabled(&'a str, bool),
}

impl DrillClient {
    pub fn new(config: &DrillConfig) -> Result<Self, ClientError> {
        let base_url = config.base_url();
        Url::parse(&base_url)
            .map_err(|e| ClientError::Config(format!("Invalid engine URL {}: {}", base_url, e)))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.query.timeout_secs))
            .build()?;

        Ok(Self {
            base_url,
            http,
            username: config.connection.username.clone(),
            password: config.connection.password.clone(),
            row_limit: config.query.row_limit,
            timeout_secs: config.query.timeout_secs,
            plugin_cache: Mutex::new(HashMap::new()),
        })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        let config = DrillConfig::from_env().map_err(|e| ClientError::Config(e.to_string()))?;
        Self::new(&config)
    }

    /// Checks whether the engine answers on its base URL.
    pub async fn is_active(&self) -> bool {
        match self.with_auth(self.http.get(&self.base_url)).send().await {
            Ok(response) => response.status().is_success(),
            Err(err) => {
                debug!(error = %err, "connectivity probe failed");
                false
            }
        }
    }

    /// Executes a SQL statement and returns its result set.
    ///
    /// An error payload from the engine surfaces as [`ClientError::Query`]
    /// with the offending statement attached.
    pub async fn query(&self, sql: &str) -> Result<QueryResult, ClientError> {
        let url = self.build_url(Endpoint::Query);
        let request = QueryRequest::sql(sql, self.row_limit);
        debug!(query = sql, "submitting query");

        let send = self.with_auth(self.http.post(&url)).json(&request).send();
        let response = tokio::time::timeout(Duration::from_secs(self.timeout_secs), send)
            .await
            .map_err(|_| ClientError::Timeout(self.timeout_secs))??;

        let status = response.status();
        let body = response.text().await?;
        let parsed: QueryResponse = serde_json::from_str(&body).map_err(|_| {
            ClientError::UnexpectedResponse(format!(
                "query failed (HTTP {}): {}",
                status,
                truncate(&body)
            ))
        })?;

        if let Some(message) = parsed.error_message.clone() {
            if let Some(trace) = &parsed.stack_trace {
                debug!(stack_trace = ?trace, "engine stack trace");
            }
            return Err(ClientError::Query {
                message,
                query: sql.to_string(),
            });
        }

        if !status.is_success() {
            return Err(ClientError::UnexpectedResponse(format!(
                "query failed (HTTP {}): {}",
                status,
                truncate(&body)
            )));
        }

        Ok(QueryResult::from_response(parsed, sql))
    }

    /// All storage plugins known to the engine, enabled or not.
    pub async fn storage_plugins(&self) -> Result<Vec<StoragePlugin>, ClientError> {
        self.get_json(&self.build_url(Endpoint::Storage)).await
    }

    pub async fn enabled_storage_plugins(&self) -> Result<Vec<StoragePlugin>, ClientError> {
        Ok(self
            .storage_plugins()
            .await?
            .into_iter()
            .filter(StoragePlugin::is_enabled)
            .collect())
    }

    pub async fn disabled_storage_plugins(&self) -> Result<Vec<StoragePlugin>, ClientError> {
        Ok(self
            .storage_plugins()
            .await?
            .into_iter()
            .filter(|p| !p.is_enabled())
            .collect())
    }

    /// Raw configuration fetch, uncached, regardless of enabled state.
    pub async fn storage_plugin_info(&self, plugin: &str) -> Result<StoragePlugin, ClientError> {
        self.get_json(&self.build_url(Endpoint::PluginInfo(plugin)))
            .await
    }

    /// Creates or updates a storage plugin.
    pub async fn save_storage_plugin(&self, plugin: StoragePlugin) -> Result<(), ClientError> {
        let url = self.build_url(Endpoint::PluginInfo(&plugin.name));
        let response = self.with_auth(self.http.post(&url)).json(&plugin).send().await?;
        let confirmation: ConfirmationResponse = response
            .json()
            .await
            .map_err(|e| ClientError::UnexpectedResponse(format!("Failed to parse response: {}", e)))?;

        if confirmation.is_success() {
            self.plugin_cache.lock().await.remove(&plugin.name);
            Ok(())
        } else {
            Err(ClientError::UnexpectedResponse(format!(
                "Unable to save storage plugin '{}': {}",
                plugin.name,
                confirmation
                    .error_message
                    .or(confirmation.result)
                    .unwrap_or_default()
            )))
        }
    }

    pub async fn delete_storage_plugin(&self, plugin: &str) -> Result<(), ClientError> {
        let url = self.build_url(Endpoint::PluginInfo(plugin));
        let response = self.with_auth(self.http.delete(&url)).send().await?;
        let confirmation: ConfirmationResponse = response
            .json()
            .await
            .map_err(|e| ClientError::UnexpectedResponse(format!("Failed to parse response: {}", e)))?;

        if confirmation.is_success() {
            self.plugin_cache.lock().await.remove(plugin);
            Ok(())
        } else {
            Err(ClientError::UnexpectedResponse(format!(
                "Unable to delete storage plugin '{}'",
                plugin
            )))
        }
    }

    pub async fn enable_plugin(&self, plugin: &str) -> Result<(), ClientError> {
        self.set_plugin_enabled(plugin, true).await
    }

    pub async fn disable_plugin(&self, plugin: &str) -> Result<(), ClientError> {
        self.set_plugin_enabled(plugin, false).await
    }

    async fn set_plugin_enabled(&self, plugin: &str, enabled: bool) -> Result<(), ClientError> {
        let confirmation: ConfirmationResponse = self
            .get_json(&self.build_url(Endpoint::PluginEnabled(plugin, enabled)))
            .await?;

        if confirmation.is_success() {
            self.plugin_cache.lock().await.remove(plugin);
            Ok(())
        } else {
            Err(ClientError::UnexpectedResponse(format!(
                "Unable to set storage plugin '{}' enabled={}",
                plugin, enabled
            )))
        }
    }

    /// Drops all memoized plugin configurations.
    pub async fn invalidate_plugin_cache(&self) {
        self.plugin_cache.lock().await.clear();
    }

    /// Resolves a path under a storage plugin to the next tree level:
    /// schemas, tables/files, or columns, depending on the plugin family and
    /// path depth.
    pub async fn resolve(
        &self,
        plugin: &str,
        path: &[String],
    ) -> Result<Vec<ResolvedNode>, ClientError> {
        resolver::resolve(self, plugin, path).await
    }

    /// Schema names under a plugin, optionally with the plugin prefix
    /// stripped.
    pub async fn schema_names(
        &self,
        plugin: &str,
        strip_plugin: bool,
    ) -> Result<Vec<String>, ClientError> {
        catalog::schema_names(self, plugin, strip_plugin).await
    }

    /// Tables (or files, for file plugins) in a schema.
    pub async fn tables(
        &self,
        plugin: &str,
        schema: &str,
    ) -> Result<Vec<ResolvedNode>, ClientError> {
        let descriptor = classifier::classify(&self.plugin_config(plugin).await?);
        let names = catalog::table_names(self, &descriptor, Some(schema)).await?;
        Ok(names
            .into_iter()
            .map(|name| {
                ResolvedNode::Table(TableNode {
                    schema: schema.to_string(),
                    name,
                })
            })
            .collect())
    }

    pub async fn view_names(
        &self,
        plugin: &str,
        schema: &str,
    ) -> Result<Vec<String>, ClientError> {
        catalog::view_names(self, plugin, Some(schema)).await
    }

    /// Columns of a fully resolved table, file, or view.
    pub async fn columns(
        &self,
        plugin: &str,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ResolvedNode>, ClientError> {
        let descriptor = classifier::classify(&self.plugin_config(plugin).await?);
        introspect::columns(self, &descriptor, Some(schema), table).await
    }

    fn build_url(&self, endpoint: Endpoint<'_>) -> String {
        let path = match endpoint {
            Endpoint::Query => "/query.json".to_string(),
            Endpoint::Storage => "/storage.json".to_string(),
            Endpoint::PluginInfo(name) => format!("/storage/{}.json", name),
            Endpoint::PluginEnabled(name, enabled) => {
                format!("/storage/{}/enable/{}", name, enabled)
            }
        };
        format!("{}{}", self.base_url, path)
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.username {
            Some(username) => request.basic_auth(username, self.password.as_deref()),
            None => request,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ClientError> {
        let response = self.with_auth(self.http.get(url)).send().await?;

        if !response.status().is_success() {
            return Err(ClientError::UnexpectedResponse(format!(
                "{} returned HTTP {}",
                url,
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::UnexpectedResponse(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait::async_trait]
impl QueryEngine for DrillClient {
    async fn execute_query(&self, sql: &str) -> Result<QueryResult, ClientError> {
        self.query(sql).await
    }

    /// Memoized per plugin name for the lifetime of the client. Unknown,
    /// disabled, or unreachable plugins surface as
    /// [`ClientError::UnresolvedPlugin`].
    async fn plugin_config(&self, plugin: &str) -> Result<StoragePlugin, ClientError> {
        {
            let cache = self.plugin_cache.lock().await;
            if let Some(hit) = cache.get(plugin) {
                debug!(plugin, fetched_at = %hit.fetched_at, "storage plugin served from cache");
                return Ok(hit.plugin.clone());
            }
        }

        let fetched = self.storage_plugin_info(plugin).await.map_err(|err| {
            warn!(plugin, error = %err, "storage plugin lookup failed");
            ClientError::UnresolvedPlugin(plugin.to_string())
        })?;

        if !fetched.is_enabled() {
            return Err(ClientError::UnresolvedPlugin(plugin.to_string()));
        }

        let mut cache = self.plugin_cache.lock().await;
        cache.insert(
            plugin.to_string(),
            CachedPlugin {
                plugin: fetched.clone(),
                fetched_at: Utc::now(),
            },
        );
        Ok(fetched)
    }
}

fn truncate(body: &str) -> String {
    const LIMIT: usize = 500;
    if body.len() <= LIMIT {
        body.to_string()
    } else {
        let cut = body
            .char_indices()
            .take_while(|(i, _)| *i < LIMIT)
            .last()
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        format!("{}...", &body[..cut])
    }
}
