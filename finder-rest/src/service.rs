//! Restaurant service
//!
//! Validates inputs, builds store queries, classifies store failures into
//! the three domain error kinds and shapes responses. Holds no state between
//! calls beyond the store handle.

use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{error, info, warn};

use finder_common::error::{Error, Result};
use finder_common::restaurant::{
    derive_location, validate_restaurant, CreatedRestaurant, Restaurant, RestaurantInput,
    SearchResults,
};
use finder_common::types::DeletedResponse;
use finder_store::{NearQuery, NewRestaurant, RecordStore, StoreError, StoreErrorCategory};

const NOT_FOUND: &str = "Restaurant not found";
const INVALID_ID: &str = "Invalid restaurant ID";
const INVALID_PARAMS: &str = "Invalid input parameters";

/// CRUD and proximity search over restaurant records
pub struct RestaurantService {
    store: Arc<dyn RecordStore>,
}

impl RestaurantService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    fn validate(operation: &str, payload: &JsonValue) -> Result<RestaurantInput> {
        validate_restaurant(payload).map_err(|errors| {
            warn!(operation, violations = %errors, "Rejected restaurant payload");
            Error::InvalidInput(errors.to_string())
        })
    }

    fn internal(operation: &str, id: Option<&str>, err: &StoreError) -> Error {
        error!(operation, id = id.unwrap_or("-"), error = %err, "Store operation failed");
        Error::Internal(err.to_string())
    }

    /// Fetch one restaurant.
    ///
    /// # Errors
    /// [`Error::NotFound`] when no record has this id or the id is malformed.
    pub async fn get(&self, id: &str) -> Result<Restaurant> {
        match self.store.find_by_id(id).await {
            Ok(Some(record)) => Ok(record.into()),
            Ok(None) => {
                warn!(operation = "get", id, "Restaurant not found");
                Err(Error::NotFound(NOT_FOUND.to_string()))
            }
            Err(err) if err.category() == StoreErrorCategory::MalformedId => {
                warn!(operation = "get", id, error = %err, "Malformed restaurant id");
                Err(Error::NotFound(NOT_FOUND.to_string()))
            }
            Err(err) => Err(Self::internal("get", Some(id), &err)),
        }
    }

    /// Validate and persist a new restaurant.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] when the payload breaks the write schema or the
    /// store rejects the document; [`Error::Internal`] for other failures.
    pub async fn add(&self, payload: &JsonValue) -> Result<CreatedRestaurant> {
        let input = Self::validate("add", payload)?;
        let restaurant = NewRestaurant {
            location: derive_location(input.latitude, input.longitude),
            name: input.name,
            address: input.address,
            latitude: input.latitude,
            longitude: input.longitude,
        };

        match self.store.insert(restaurant).await {
            Ok(record) => {
                info!(operation = "add", id = %record.id, "Restaurant added");
                Ok(CreatedRestaurant {
                    restaurant: record.into(),
                    status_code: 201,
                })
            }
            Err(err)
                if matches!(
                    err.category(),
                    StoreErrorCategory::Validation | StoreErrorCategory::Cast
                ) =>
            {
                warn!(operation = "add", error = %err, "Store rejected restaurant");
                Err(Error::InvalidInput(err.to_string()))
            }
            Err(err) => Err(Self::internal("add", None, &err)),
        }
    }

    /// Replace name, address and coordinates of an existing restaurant.
    ///
    /// Load-then-save: concurrent updates to the same id are last-write-wins.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] for write-schema violations or a store
    /// rejection; [`Error::NotFound`] when the id is unknown or malformed;
    /// [`Error::Internal`] otherwise.
    pub async fn update(&self, id: &str, payload: &JsonValue) -> Result<Restaurant> {
        let input = Self::validate("update", payload)?;

        let mut record = match self.store.find_by_id(id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                warn!(operation = "update", id, "Restaurant not found");
                return Err(Error::NotFound(NOT_FOUND.to_string()));
            }
            Err(err) if err.category() == StoreErrorCategory::MalformedId => {
                warn!(operation = "update", id, error = %err, "Malformed restaurant id");
                return Err(Error::NotFound(INVALID_ID.to_string()));
            }
            Err(err) => return Err(Self::internal("update", Some(id), &err)),
        };

        record.location = derive_location(input.latitude, input.longitude);
        record.name = input.name;
        record.address = input.address;
        record.latitude = input.latitude;
        record.longitude = input.longitude;

        match self.store.replace(&record).await {
            Ok(Some(updated)) => {
                info!(operation = "update", id, "Restaurant updated");
                Ok(updated.into())
            }
            Ok(None) => {
                warn!(operation = "update", id, "Restaurant deleted during update");
                Err(Error::NotFound(NOT_FOUND.to_string()))
            }
            Err(err) if err.category() == StoreErrorCategory::MalformedId => {
                Err(Error::NotFound(INVALID_ID.to_string()))
            }
            Err(err)
                if matches!(
                    err.category(),
                    StoreErrorCategory::Validation | StoreErrorCategory::Cast
                ) =>
            {
                warn!(operation = "update", id, error = %err, "Store rejected restaurant");
                Err(Error::InvalidInput(err.to_string()))
            }
            Err(err) => Err(Self::internal("update", Some(id), &err)),
        }
    }

    /// Hard-delete a restaurant.
    ///
    /// # Errors
    /// [`Error::NotFound`] when the id is unknown or malformed.
    pub async fn delete(&self, id: &str) -> Result<DeletedResponse> {
        match self.store.delete_by_id(id).await {
            Ok(Some(_)) => {
                info!(operation = "delete", id, "Restaurant deleted");
                Ok(DeletedResponse::restaurant())
            }
            Ok(None) => {
                warn!(operation = "delete", id, "Restaurant not found");
                Err(Error::NotFound(NOT_FOUND.to_string()))
            }
            Err(err) if err.category() == StoreErrorCategory::MalformedId => {
                warn!(operation = "delete", id, error = %err, "Malformed restaurant id");
                Err(Error::NotFound(NOT_FOUND.to_string()))
            }
            Err(err) => Err(Self::internal("delete", Some(id), &err)),
        }
    }

    /// Restaurants in `query.city` within the query radius, nearest first.
    ///
    /// # Errors
    /// [`Error::InvalidInput`] when the store rejects the parameters;
    /// [`Error::Internal`] otherwise.
    pub async fn search(&self, query: &NearQuery) -> Result<SearchResults> {
        match self.store.find_near(query).await {
            Ok(records) => Ok(SearchResults {
                restaurants: records.into_iter().map(Restaurant::from).collect(),
            }),
            Err(err)
                if matches!(
                    err.category(),
                    StoreErrorCategory::Cast | StoreErrorCategory::Validation
                ) =>
            {
                warn!(operation = "search", city = %query.city, error = %err, "Rejected search parameters");
                Err(Error::InvalidInput(INVALID_PARAMS.to_string()))
            }
            Err(err) => Err(Self::internal("search", None, &err)),
        }
    }
}
