//! Configuration for the todo service
//!
//! Settings come from a TOML file, then environment variables, then the
//! command line (applied in `main`), and are validated last.

use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::str::FromStr;

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "todo-service.toml";

/// Available storage backend types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    /// In-process store, lost on restart
    Memory,
    /// MongoDB (needs the `mongodb` feature)
    Mongo,
}

impl FromStr for StorageType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageType::Memory),
            "mongo" | "mongodb" => Ok(StorageType::Mongo),
            other => Err(Error::config(format!(
                "Invalid storage type: {}. Valid options: memory, mongo",
                other
            ))),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Identifier assignment
    #[serde(default)]
    pub ids: IdConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub http_addr: SocketAddr,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage backend type
    pub storage_type: StorageType,

    /// MongoDB connection string
    pub mongo_uri: String,

    /// MongoDB database name
    pub database: String,

    /// Collection holding the todos
    pub collection: String,

    /// Upsert the sample todos at startup
    pub seed_demo_data: bool,
}

/// Identifier assignment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdConfig {
    /// Inserts tried, each with a fresh id, before a create reports a conflict
    pub max_insert_attempts: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (pretty, json)
    pub format: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_type: StorageType::Memory,
            mongo_uri: "mongodb://localhost:27017/todos".to_string(),
            database: "todos".to_string(),
            collection: "todos".to_string(),
            seed_demo_data: false,
        }
    }
}

impl Default for IdConfig {
    fn default() -> Self {
        Self {
            max_insert_attempts: 8,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file (or the default file if present),
    /// apply environment overrides and validate
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let config = Self::from_file(path)?;
                tracing::info!("Loaded configuration from: {}", path);
                config
            }
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE)?,
            None => Config::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {}", e)))?;

        toml::from_str(&contents)
            .map_err(|e| Error::config(format!("Failed to parse config file: {}", e)))
    }

    /// Apply overrides from an environment-style lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("TODO_HTTP_ADDR") {
            self.server.http_addr = addr
                .parse()
                .map_err(|e| Error::config(format!("Invalid HTTP address: {}", e)))?;
        }

        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .parse()
                .map_err(|e| Error::config(format!("Invalid port: {}", e)))?;
            self.server.http_addr.set_port(port);
        }

        if let Some(storage_type) = lookup("TODO_STORAGE") {
            self.storage.storage_type = storage_type.parse()?;
        }

        if let Some(uri) = lookup("MONGO_URI") {
            self.storage.mongo_uri = uri;
        }

        if let Some(database) = lookup("MONGO_DB") {
            self.storage.database = database;
        }

        if let Some(level) = lookup("TODO_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = lookup("TODO_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => return Err(Error::config(format!("Invalid log level: {}", other))),
        }

        match self.logging.format.as_str() {
            "pretty" | "json" => {}
            other => return Err(Error::config(format!("Invalid log format: {}", other))),
        }

        if self.ids.max_insert_attempts == 0 {
            return Err(Error::config("ids.max_insert_attempts must be at least 1"));
        }

        if self.storage.storage_type == StorageType::Mongo {
            if !self.storage.mongo_uri.starts_with("mongodb://")
                && !self.storage.mongo_uri.starts_with("mongodb+srv://")
            {
                return Err(Error::config(format!(
                    "Invalid MongoDB URI: {}",
                    self.storage.mongo_uri
                )));
            }
            if self.storage.database.is_empty() || self.storage.collection.is_empty() {
                return Err(Error::config("MongoDB database and collection must be set"));
            }
        }

        Ok(())
    }
}
