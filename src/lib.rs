//! Restaurant Finder
//!
//! A restaurant directory with CRUD and proximity search, served over HTTP.
//!
//! # Features
//!
//! - **Restaurant records** - Create, fetch, replace and delete by id
//! - **Proximity search** - City substring plus point and radius, nearest first
//! - **Pluggable store** - MongoDB with a `2dsphere` index, or in-memory
//! - **Rate limiting** - Fixed window per client IP
//! - **API docs** - OpenAPI served through Swagger UI

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub use finder_common as common;
pub use finder_rest as rest;
pub use finder_store as store;

use std::sync::Arc;
use tracing::info;

use finder_common::config::{DatabaseConfig, FinderConfig, StoreBackend};
use finder_common::error::{Error, Result};
use finder_store::{InMemoryStore, MongoStore, RecordStore};

/// Construct the record store selected by the database configuration.
///
/// For MongoDB this connects and makes sure the geospatial index exists.
///
/// # Errors
/// Returns an error if the store cannot be reached or refuses the index.
pub async fn build_store(config: &DatabaseConfig) -> Result<Arc<dyn RecordStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory record store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Mongo => {
            let store = MongoStore::connect(config)
                .await
                .map_err(|e| Error::Internal(format!("MongoDB connection failed: {e}")))?;
            store
                .ensure_indexes()
                .await
                .map_err(|e| Error::Internal(format!("Index creation failed: {e}")))?;
            Ok(Arc::new(store))
        }
    }
}

/// Main restaurant finder server
pub struct FinderServer {
    config: FinderConfig,
    rest_server: Arc<finder_rest::RestServer>,
}

impl FinderServer {
    /// Create a server with the configured store
    ///
    /// # Errors
    /// Returns an error if the configuration is invalid or the store cannot
    /// be constructed.
    pub async fn new(config: FinderConfig) -> Result<Self> {
        config.validate()?;
        let store = build_store(&config.database).await?;
        Ok(Self::with_store(config, store))
    }

    /// Create a server over an existing store
    #[must_use]
    pub fn with_store(config: FinderConfig, store: Arc<dyn RecordStore>) -> Self {
        info!("Initializing restaurant finder");
        let rest_server = Arc::new(finder_rest::RestServer::new(&config, store));
        Self {
            config,
            rest_server,
        }
    }

    /// Get reference to the REST server
    #[must_use]
    pub fn rest(&self) -> &finder_rest::RestServer {
        &self.rest_server
    }

    /// Get the configuration
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Serve until the HTTP server stops
    ///
    /// # Errors
    /// Returns an error if the REST server fails to start.
    pub async fn run(&self) -> Result<()> {
        info!(
            "  - REST service: http://{}:{}/v1/restaurants",
            self.config.server.host, self.config.server.port
        );
        self.rest_server.run().await
    }

    /// Shutdown gracefully
    ///
    /// # Errors
    /// Returns an error if shutdown fails.
    pub async fn shutdown(&self) -> Result<()> {
        info!("Shutting down restaurant finder");
        Ok(())
    }
}
