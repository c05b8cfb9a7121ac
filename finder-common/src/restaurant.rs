//! Restaurant domain types: write schema, projection and derived location

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use utoipa::ToSchema;

// ============================================================================
// Geospatial point
// ============================================================================

/// GeoJSON geometry tag. Only points are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointKind {
    Point,
}

/// GeoJSON point, coordinates ordered `[longitude, latitude]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: PointKind,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

/// Build the stored `location` for a pair of visible coordinates.
///
/// Called before every write so `location` never drifts from
/// `latitude`/`longitude`.
#[must_use]
pub fn derive_location(latitude: f64, longitude: f64) -> GeoPoint {
    GeoPoint {
        kind: PointKind::Point,
        coordinates: [longitude, latitude],
    }
}

// ============================================================================
// Write schema
// ============================================================================

/// Validated body of a create or update request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RestaurantInput {
    #[schema(example = "Cafe Delight")]
    pub name: String,
    #[schema(example = "123 Main St, New York, NY")]
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// A single write-schema rule that a payload broke
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: &'static str,
    pub message: String,
}

/// Every violation found in one payload, in field order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors {
    pub violations: Vec<FieldViolation>,
}

impl ValidationErrors {
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.violations.iter().map(|v| v.message.clone()).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

fn text_field(
    payload: &JsonValue,
    field: &'static str,
    label: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<String> {
    let message = match payload.get(field) {
        None | Some(JsonValue::Null) => format!("{label} is required"),
        Some(JsonValue::String(s)) if s.is_empty() => format!("{label} cannot be empty"),
        Some(JsonValue::String(s)) => return Some(s.clone()),
        Some(_) => format!("{label} should be a string"),
    };
    violations.push(FieldViolation { field, message });
    None
}

fn number_field(
    payload: &JsonValue,
    field: &'static str,
    label: &str,
    violations: &mut Vec<FieldViolation>,
) -> Option<f64> {
    let message = match payload.get(field) {
        None | Some(JsonValue::Null) => format!("{label} is required"),
        Some(JsonValue::String(s)) if s.is_empty() => format!("{label} cannot be empty"),
        Some(JsonValue::Number(n)) => match n.as_f64() {
            Some(value) if value.is_finite() => return Some(value),
            _ => format!("{label} should be a number"),
        },
        Some(_) => format!("{label} should be a number"),
    };
    violations.push(FieldViolation { field, message });
    None
}

/// Check a raw request body against the write schema.
///
/// # Errors
/// Returns every violated rule when any required field is missing, empty or
/// of the wrong type.
pub fn validate_restaurant(payload: &JsonValue) -> Result<RestaurantInput, ValidationErrors> {
    if !payload.is_object() {
        return Err(ValidationErrors {
            violations: vec![FieldViolation {
                field: "body",
                message: "Request body must be a JSON object".to_string(),
            }],
        });
    }

    let mut violations = Vec::new();
    let name = text_field(payload, "name", "Name", &mut violations);
    let address = text_field(payload, "address", "Address", &mut violations);
    let latitude = number_field(payload, "latitude", "Latitude", &mut violations);
    let longitude = number_field(payload, "longitude", "Longitude", &mut violations);

    match (name, address, latitude, longitude) {
        (Some(name), Some(address), Some(latitude), Some(longitude)) if violations.is_empty() => {
            Ok(RestaurantInput {
                name,
                address,
                latitude,
                longitude,
            })
        }
        _ => Err(ValidationErrors { violations }),
    }
}

// ============================================================================
// Projections
// ============================================================================

/// What callers see of a stored restaurant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Restaurant {
    #[schema(example = "65a1f0c2e4b0a1b2c3d4e5f6")]
    pub id: String,
    pub name: String,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Returned by `POST /v1/restaurants`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CreatedRestaurant {
    pub restaurant: Restaurant,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

/// Returned by `GET /v1/restaurants`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SearchResults {
    pub restaurants: Vec<Restaurant>,
}
