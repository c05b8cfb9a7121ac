//! Record store contract
//!
//! Any document database that can look records up by id, insert, replace,
//! delete and answer a geo near-query can back the restaurant service.

use finder_common::restaurant::{GeoPoint, Restaurant};
use serde::{Deserialize, Serialize};

use crate::error::StoreResult;

/// A restaurant as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location: GeoPoint,
    /// Filter-only attributes, never written through the API
    pub cuisine: Option<String>,
    pub price_range: Option<String>,
    pub rating: Option<f64>,
}

impl From<&RestaurantRecord> for Restaurant {
    fn from(record: &RestaurantRecord) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            address: record.address.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

impl From<RestaurantRecord> for Restaurant {
    fn from(record: RestaurantRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            address: record.address,
            latitude: record.latitude,
            longitude: record.longitude,
        }
    }
}

/// A restaurant about to be inserted; the store assigns the id
#[derive(Debug, Clone, PartialEq)]
pub struct NewRestaurant {
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub location: GeoPoint,
}

/// Proximity search with optional attribute filters, all ANDed
#[derive(Debug, Clone, PartialEq)]
pub struct NearQuery {
    /// Case-insensitive substring of `address`
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Upper bound on distance from the query point, in meters
    pub max_distance_m: f64,
    pub cuisine: Option<String>,
    pub price_range: Option<String>,
    pub min_rating: Option<f64>,
}

impl NearQuery {
    /// Query on location and city only
    #[must_use]
    pub fn new(city: impl Into<String>, latitude: f64, longitude: f64, max_distance_m: f64) -> Self {
        Self {
            city: city.into(),
            latitude,
            longitude,
            max_distance_m,
            cuisine: None,
            price_range: None,
            min_rating: None,
        }
    }

    #[must_use]
    pub fn with_cuisine(mut self, cuisine: impl Into<String>) -> Self {
        self.cuisine = Some(cuisine.into());
        self
    }

    #[must_use]
    pub fn with_price_range(mut self, price_range: impl Into<String>) -> Self {
        self.price_range = Some(price_range.into());
        self
    }

    #[must_use]
    pub fn with_min_rating(mut self, min_rating: f64) -> Self {
        self.min_rating = Some(min_rating);
        self
    }
}

/// Storage operations the restaurant service relies on
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Look a record up by id; `Ok(None)` when absent
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<RestaurantRecord>>;

    /// Persist a new record and return it with its assigned id
    async fn insert(&self, restaurant: NewRestaurant) -> StoreResult<RestaurantRecord>;

    /// Replace the stored document with the same id; `Ok(None)` when it no
    /// longer exists
    async fn replace(&self, record: &RestaurantRecord) -> StoreResult<Option<RestaurantRecord>>;

    /// Remove a record, returning what was deleted
    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<RestaurantRecord>>;

    /// Records matching the query, nearest first
    async fn find_near(&self, query: &NearQuery) -> StoreResult<Vec<RestaurantRecord>>;
}
