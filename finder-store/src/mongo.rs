//! MongoDB record store
//!
//! Thin wrapper over a `mongodb` collection. Geospatial filtering is delegated
//! entirely to the server's `2dsphere` index and `$near` operator.

use std::time::Duration;

use bson::oid::ObjectId;
use bson::{doc, Document};
use futures::TryStreamExt;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use finder_common::config::DatabaseConfig;
use finder_common::restaurant::GeoPoint;

use crate::backend::{NearQuery, NewRestaurant, RecordStore, RestaurantRecord};
use crate::error::{StoreError, StoreResult};

/// Stored shape of a restaurant document
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RestaurantDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    name: String,
    address: String,
    latitude: f64,
    longitude: f64,
    location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cuisine: Option<String>,
    #[serde(rename = "priceRange", default, skip_serializing_if = "Option::is_none")]
    price_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rating: Option<f64>,
}

impl RestaurantDocument {
    fn into_record(self, id: ObjectId) -> RestaurantRecord {
        RestaurantRecord {
            id: id.to_hex(),
            name: self.name,
            address: self.address,
            latitude: self.latitude,
            longitude: self.longitude,
            location: self.location,
            cuisine: self.cuisine,
            price_range: self.price_range,
            rating: self.rating,
        }
    }

    fn try_into_record(self) -> StoreResult<RestaurantRecord> {
        let id = self
            .id
            .ok_or_else(|| StoreError::Backend("document without _id".to_string()))?;
        Ok(self.into_record(id))
    }
}

/// Build the `find` filter for a near-query.
///
/// The city is matched literally: regex metacharacters in it are escaped.
#[must_use]
pub fn near_filter(query: &NearQuery) -> Document {
    let mut filter = doc! {
        "address": {
            "$regex": regex::escape(&query.city),
            "$options": "i"
        },
        "location": {
            "$near": {
                "$geometry": {
                    "type": "Point",
                    "coordinates": [query.longitude, query.latitude]
                },
                "$maxDistance": query.max_distance_m
            }
        }
    };

    if let Some(cuisine) = &query.cuisine {
        filter.insert("cuisine", cuisine.as_str());
    }
    if let Some(price_range) = &query.price_range {
        filter.insert("priceRange", price_range.as_str());
    }
    if let Some(min_rating) = query.min_rating {
        filter.insert("rating", doc! { "$gte": min_rating });
    }

    filter
}

/// Record store backed by a MongoDB collection
#[derive(Clone)]
pub struct MongoStore {
    collection: Collection<RestaurantDocument>,
}

impl MongoStore {
    /// Connect using the database section of the service configuration
    ///
    /// # Errors
    /// Returns an error if the connection string cannot be parsed or the
    /// client cannot be built.
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        let timeout = Duration::from_secs(config.connect_timeout_secs);
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.app_name = Some("restaurant-finder".to_string());

        let client = Client::with_options(options)?;
        let collection = client
            .database(&config.name)
            .collection::<RestaurantDocument>(&config.collection);

        info!(
            "Using MongoDB collection {}.{}",
            config.name, config.collection
        );

        Ok(Self { collection })
    }

    /// Create the `2dsphere` index on `location` if it does not exist
    ///
    /// # Errors
    /// Returns an error if the server rejects the index build.
    pub async fn ensure_indexes(&self) -> StoreResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "location": "2dsphere" })
            .build();
        let result = self.collection.create_index(index, None).await?;
        info!("Geospatial index ready: {}", result.index_name);
        Ok(())
    }
}

#[async_trait::async_trait]
impl RecordStore for MongoStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<RestaurantRecord>> {
        let oid = ObjectId::parse_str(id)?;
        let found = self.collection.find_one(doc! { "_id": oid }, None).await?;
        Ok(found.map(|document| document.into_record(oid)))
    }

    async fn insert(&self, restaurant: NewRestaurant) -> StoreResult<RestaurantRecord> {
        let document = RestaurantDocument {
            id: None,
            name: restaurant.name,
            address: restaurant.address,
            latitude: restaurant.latitude,
            longitude: restaurant.longitude,
            location: restaurant.location,
            cuisine: None,
            price_range: None,
            rating: None,
        };

        let result = self.collection.insert_one(&document, None).await?;
        let oid = result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| StoreError::Backend("server returned a non-ObjectId _id".to_string()))?;

        Ok(document.into_record(oid))
    }

    async fn replace(&self, record: &RestaurantRecord) -> StoreResult<Option<RestaurantRecord>> {
        let oid = ObjectId::parse_str(&record.id)?;
        let document = RestaurantDocument {
            id: Some(oid),
            name: record.name.clone(),
            address: record.address.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            location: record.location,
            cuisine: record.cuisine.clone(),
            price_range: record.price_range.clone(),
            rating: record.rating,
        };

        let result = self
            .collection
            .replace_one(doc! { "_id": oid }, &document, None)
            .await?;

        if result.matched_count == 0 {
            return Ok(None);
        }
        Ok(Some(document.into_record(oid)))
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<RestaurantRecord>> {
        let oid = ObjectId::parse_str(id)?;
        let deleted = self
            .collection
            .find_one_and_delete(doc! { "_id": oid }, None)
            .await?;
        Ok(deleted.map(|document| document.into_record(oid)))
    }

    async fn find_near(&self, query: &NearQuery) -> StoreResult<Vec<RestaurantRecord>> {
        let filter = near_filter(query);
        debug!("Running near-query: {}", filter);

        let cursor = self.collection.find(filter, None).await?;
        let documents: Vec<RestaurantDocument> = cursor.try_collect().await?;

        documents
            .into_iter()
            .map(RestaurantDocument::try_into_record)
            .collect()
    }
}
