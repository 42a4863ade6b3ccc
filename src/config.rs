use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct DrillConfig {
    pub connection: ConnectionConfig,
    pub query: QueryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionConfig {
    pub host: String,
    pub port: u16,
    pub ssl: bool,
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Row cap sent with every query as the engine's auto limit.
    pub row_limit: usize,
    pub timeout_secs: u64,
}

impl DrillConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("connection.host", "localhost")?
            .set_default("connection.port", 8047)?
            .set_default("connection.ssl", false)?
            .set_default("connection.username", None::<String>)?
            .set_default("connection.password", None::<String>)?
            .set_default("query.row_limit", 10000)?
            .set_default("query.timeout_secs", 30)?;

        // Load from environment variables
        if let Ok(host) = env::var("DRILL_HOST") {
            builder = builder.set_override("connection.host", host)?;
        }

        if let Ok(port) = env::var("DRILL_PORT") {
            builder = builder.set_override("connection.port", port.parse::<u16>().unwrap_or(8047))?;
        }

        if let Ok(ssl) = env::var("DRILL_SSL") {
            builder = builder.set_override("connection.ssl", ssl.parse::<bool>().unwrap_or(false))?;
        }

        if let Ok(username) = env::var("DRILL_USERNAME") {
            builder = builder.set_override("connection.username", Some(username))?;
        }

        if let Ok(password) = env::var("DRILL_PASSWORD") {
            builder = builder.set_override("connection.password", Some(password))?;
        }

        if let Ok(row_limit) = env::var("DRILL_ROW_LIMIT") {
            builder =
                builder.set_override("query.row_limit", row_limit.parse::<u64>().unwrap_or(10000))?;
        }

        if let Ok(timeout) = env::var("DRILL_QUERY_TIMEOUT") {
            builder =
                builder.set_override("query.timeout_secs", timeout.parse::<u64>().unwrap_or(30))?;
        }

        // Try to load from .env file
        let _ = dotenv::dotenv();

        builder.build()?.try_deserialize()
    }

    pub fn base_url(&self) -> String {
        let protocol = if self.connection.ssl { "https" } else { "http" };
        format!(
            "{}://{}:{}",
            protocol, self.connection.host, self.connection.port
        )
    }
}

impl Default for DrillConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig {
                host: "localhost".to_string(),
                port: 8047,
                ssl: false,
                username: None,
                password: None,
            },
            query: QueryConfig {
                row_limit: 10000,
                timeout_secs: 30,
            },
        }
    }
}
