//! In-memory record store for development and testing
//!
//! Ids are ObjectIds and coordinates outside the 2dsphere domain are
//! rejected. Near-queries use great-circle distance, nearest first.

use std::collections::HashMap;

use bson::oid::ObjectId;
use geo::{Distance, Haversine, Point};
use parking_lot::RwLock;

use finder_common::restaurant::GeoPoint;

use crate::backend::{NearQuery, NewRestaurant, RecordStore, RestaurantRecord};
use crate::error::{StoreError, StoreResult};

/// Process-local store keyed by ObjectId
pub struct InMemoryStore {
    records: RwLock<HashMap<ObjectId, RestaurantRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Store a fully formed record as-is, including filter-only attributes.
    ///
    /// Stands in for documents written to the database by other tools.
    ///
    /// # Errors
    /// Returns [`StoreError::MalformedId`] if `record.id` is not an ObjectId.
    pub fn seed(&self, record: RestaurantRecord) -> StoreResult<()> {
        let id = ObjectId::parse_str(&record.id)?;
        self.records.write().insert(id, record);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    fn check_geo_key(location: &GeoPoint) -> StoreResult<()> {
        let (lon, lat) = (location.longitude(), location.latitude());
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(StoreError::Validation(format!(
                "Can't extract geo keys: longitude/latitude is out of bounds, lng: {lon} lat: {lat}"
            )));
        }
        Ok(())
    }

    fn matches(record: &RestaurantRecord, query: &NearQuery, city: &str) -> bool {
        if !record.address.to_lowercase().contains(city) {
            return false;
        }
        if let Some(cuisine) = &query.cuisine {
            if record.cuisine.as_ref() != Some(cuisine) {
                return false;
            }
        }
        if let Some(price_range) = &query.price_range {
            if record.price_range.as_ref() != Some(price_range) {
                return false;
            }
        }
        if let Some(min_rating) = query.min_rating {
            if !record.rating.is_some_and(|rating| rating >= min_rating) {
                return false;
            }
        }
        true
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryStore {
    async fn find_by_id(&self, id: &str) -> StoreResult<Option<RestaurantRecord>> {
        let id = ObjectId::parse_str(id)?;
        Ok(self.records.read().get(&id).cloned())
    }

    async fn insert(&self, restaurant: NewRestaurant) -> StoreResult<RestaurantRecord> {
        Self::check_geo_key(&restaurant.location)?;

        let id = ObjectId::new();
        let record = RestaurantRecord {
            id: id.to_hex(),
            name: restaurant.name,
            address: restaurant.address,
            latitude: restaurant.latitude,
            longitude: restaurant.longitude,
            location: restaurant.location,
            cuisine: None,
            price_range: None,
            rating: None,
        };

        self.records.write().insert(id, record.clone());
        Ok(record)
    }

    async fn replace(&self, record: &RestaurantRecord) -> StoreResult<Option<RestaurantRecord>> {
        let id = ObjectId::parse_str(&record.id)?;
        Self::check_geo_key(&record.location)?;

        let mut records = self.records.write();
        match records.get_mut(&id) {
            Some(existing) => {
                *existing = record.clone();
                Ok(Some(record.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<Option<RestaurantRecord>> {
        let id = ObjectId::parse_str(id)?;
        Ok(self.records.write().remove(&id))
    }

    async fn find_near(&self, query: &NearQuery) -> StoreResult<Vec<RestaurantRecord>> {
        if !query.max_distance_m.is_finite() || query.max_distance_m < 0.0 {
            return Err(StoreError::Cast(format!(
                "$maxDistance must be a non-negative number, got {}",
                query.max_distance_m
            )));
        }
        if !(-180.0..=180.0).contains(&query.longitude) || !(-90.0..=90.0).contains(&query.latitude) {
            return Err(StoreError::Cast(format!(
                "invalid point in geo near query $geometry argument: [{}, {}]",
                query.longitude, query.latitude
            )));
        }

        let origin = Point::new(query.longitude, query.latitude);
        let city = query.city.to_lowercase();

        let mut hits: Vec<(f64, RestaurantRecord)> = self
            .records
            .read()
            .values()
            .filter(|record| Self::matches(record, query, &city))
            .filter_map(|record| {
                let point = Point::new(record.location.longitude(), record.location.latitude());
                let distance = Haversine.distance(origin, point);
                (distance <= query.max_distance_m).then(|| (distance, record.clone()))
            })
            .collect();

        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(hits.into_iter().map(|(_, record)| record).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use finder_common::restaurant::derive_location;

    fn new_restaurant(name: &str, address: &str, latitude: f64, longitude: f64) -> NewRestaurant {
        NewRestaurant {
            name: name.to_string(),
            address: address.to_string(),
            latitude,
            longitude,
            location: derive_location(latitude, longitude),
        }
    }

    fn seeded(
        name: &str,
        latitude: f64,
        longitude: f64,
        cuisine: Option<&str>,
        price_range: Option<&str>,
        rating: Option<f64>,
    ) -> RestaurantRecord {
        RestaurantRecord {
            id: ObjectId::new().to_hex(),
            name: name.to_string(),
            address: format!("{name}, New York, NY"),
            latitude,
            longitude,
            location: derive_location(latitude, longitude),
            cuisine: cuisine.map(str::to_string),
            price_range: price_range.map(str::to_string),
            rating,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_object_id() {
        let store = InMemoryStore::new();
        let record = store
            .insert(new_restaurant("Cafe Delight", "123 Main St, New York, NY", 40.7112, -74.0055))
            .await
            .unwrap();

        assert!(ObjectId::parse_str(&record.id).is_ok());
        assert_eq!(store.len(), 1);

        let found = store.find_by_id(&record.id).await.unwrap().unwrap();
        assert_eq!(found, record);
    }

    #[tokio::test]
    async fn test_malformed_id() {
        let store = InMemoryStore::new();
        let err = store.find_by_id("mocked-id").await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedId(_)));

        let err = store.delete_by_id("non-existent-id").await.unwrap_err();
        assert!(matches!(err, StoreError::MalformedId(_)));
    }

    #[tokio::test]
    async fn test_out_of_range_coordinates_rejected() {
        let store = InMemoryStore::new();
        let err = store
            .insert(new_restaurant("Nowhere", "Edge of the map", 91.0, 0.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_replace_missing_record() {
        let store = InMemoryStore::new();
        let record = seeded("Ghost", 40.0, -74.0, None, None, None);
        assert_eq!(store.replace(&record).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_delete_returns_removed_record() {
        let store = InMemoryStore::new();
        let record = store
            .insert(new_restaurant("Cafe", "Main St", 1.0, 1.0))
            .await
            .unwrap();

        assert_eq!(store.delete_by_id(&record.id).await.unwrap(), Some(record.clone()));
        assert_eq!(store.delete_by_id(&record.id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_find_near_orders_by_distance() {
        let store = InMemoryStore::new();
        // About 180 m and 580 m from the query point.
        let far = seeded("Far Diner", 40.7170, -74.0100, None, None, None);
        let near = seeded("Near Cafe", 40.7112, -74.0055, None, None, None);
        let outside = seeded("Brooklyn Bistro", 40.6782, -73.9442, None, None, None);
        store.seed(far.clone()).unwrap();
        store.seed(near.clone()).unwrap();
        store.seed(outside).unwrap();

        let hits = store
            .find_near(&NearQuery::new("new york", 40.7128, -74.0060, 1000.0))
            .await
            .unwrap();

        let names: Vec<_> = hits.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Near Cafe", "Far Diner"]);
    }

    #[tokio::test]
    async fn test_find_near_city_is_case_insensitive_substring() {
        let store = InMemoryStore::new();
        store
            .seed(seeded("Cafe", 40.7112, -74.0055, None, None, None))
            .unwrap();

        let query = NearQuery::new("YORK", 40.7128, -74.0060, 1000.0);
        assert_eq!(store.find_near(&query).await.unwrap().len(), 1);

        let query = NearQuery::new("Boston", 40.7128, -74.0060, 1000.0);
        assert!(store.find_near(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_near_attribute_filters() {
        let store = InMemoryStore::new();
        store
            .seed(seeded("Luigi", 40.7112, -74.0055, Some("Italian"), Some("$$"), Some(4.5)))
            .unwrap();
        store
            .seed(seeded("Wok", 40.7115, -74.0058, Some("Chinese"), Some("$"), Some(3.8)))
            .unwrap();
        store
            .seed(seeded("Unrated", 40.7116, -74.0059, Some("Italian"), None, None))
            .unwrap();

        let base = NearQuery::new("New York", 40.7128, -74.0060, 1000.0);
        assert_eq!(store.find_near(&base).await.unwrap().len(), 3);

        let italian = base.clone().with_cuisine("Italian");
        assert_eq!(store.find_near(&italian).await.unwrap().len(), 2);

        let cheap = base.clone().with_price_range("$");
        let hits = store.find_near(&cheap).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Wok");

        let rated = base.clone().with_min_rating(4.0);
        let hits = store.find_near(&rated).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Luigi");

        let none = base.with_cuisine("Italian").with_price_range("$");
        assert!(store.find_near(&none).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_near_rejects_bad_parameters() {
        let store = InMemoryStore::new();

        let err = store
            .find_near(&NearQuery::new("x", 0.0, 0.0, -1.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Cast(_)));

        let err = store
            .find_near(&NearQuery::new("x", 120.0, 0.0, 10.0))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Cast(_)));
    }
}
