//! Configuration types for the restaurant finder

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration for the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderConfig {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// Document store configuration
    pub database: DatabaseConfig,
    /// Request rate limiting
    pub rate_limit: RateLimitSettings,
    /// OpenAPI documentation
    pub docs: DocsConfig,
}

impl FinderConfig {
    /// Check the configuration for values the server cannot run with
    ///
    /// # Errors
    /// Returns [`Error::Config`] naming the first offending setting.
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::Config("server.port must be non-zero".into()));
        }
        if self.server.workers == 0 {
            return Err(Error::Config("server.workers must be non-zero".into()));
        }
        if self.database.name.trim().is_empty() {
            return Err(Error::Config("database.name must not be empty".into()));
        }
        if self.database.collection.trim().is_empty() {
            return Err(Error::Config("database.collection must not be empty".into()));
        }
        if self.rate_limit.enabled {
            if self.rate_limit.max_requests == 0 {
                return Err(Error::Config("rate_limit.max_requests must be non-zero".into()));
            }
            if self.rate_limit.window_secs == 0 {
                return Err(Error::Config("rate_limit.window_secs must be non-zero".into()));
            }
        }
        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on (default: 3000)
    pub port: u16,
    /// Number of actix workers
    pub workers: usize,
    /// CORS allowed origins
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            workers: 4,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Which record store backs the service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// MongoDB with a 2dsphere index on `location`
    Mongo,
    /// Process-local store, for development and tests
    Memory,
}

/// Document store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    /// Connection string
    pub uri: String,
    /// Database name
    pub name: String,
    /// Collection holding restaurant documents
    pub collection: String,
    /// Seconds to wait for the initial connection
    pub connect_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Mongo,
            uri: "mongodb://localhost:27017".to_string(),
            name: "restaurant-finder".to_string(),
            collection: "restaurants".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

/// Fixed-window rate limit policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitSettings {
    pub enabled: bool,
    /// Requests allowed per client within one window
    pub max_requests: u32,
    /// Window length in seconds
    pub window_secs: u64,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 10,
            window_secs: 60,
        }
    }
}

/// OpenAPI / Swagger UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsConfig {
    pub enabled: bool,
    pub title: String,
    pub description: String,
    pub version: String,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            title: "Restaurant Finder".to_string(),
            description: "API to create restaurants and find the ones closest to users".to_string(),
            version: "1.0".to_string(),
        }
    }
}
