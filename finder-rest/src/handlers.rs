//! HTTP handlers for the restaurant endpoints

use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;
use utoipa::IntoParams;

use finder_common::error::Error;
use finder_common::types::ApiError;
use finder_store::NearQuery;

use crate::ratelimit::{RateLimitResult, RateLimiter};
use crate::service::RestaurantService;

// ============================================================================
// Error and rate limit responses
// ============================================================================

/// Render a domain error as a JSON response
pub fn error_response(err: &Error) -> HttpResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status).json(ApiError::new(err.error_code(), err.public_message()))
}

/// Count the request against its peer IP and return the 429 response once
/// the client is over its limit. Requests without a peer address pass.
pub fn rate_limited(req: &HttpRequest, limiter: &RateLimiter) -> Option<HttpResponse> {
    let ip = req.peer_addr()?.ip();
    match limiter.check_ip(ip) {
        RateLimitResult::Allowed { .. } => None,
        RateLimitResult::Limited { retry_after, .. } => {
            warn!(client = %ip, "Rate limit exceeded");
            let seconds = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
            Some(
                HttpResponse::TooManyRequests()
                    .insert_header(("Retry-After", seconds.to_string()))
                    .json(ApiError::new(
                        Error::RateLimited.error_code(),
                        Error::RateLimited.to_string(),
                    )),
            )
        }
    }
}

// ============================================================================
// Search parameters
// ============================================================================

/// Query string of `GET /v1/restaurants`.
///
/// Values arrive as raw text so presence and type can be reported with the
/// endpoint's own status codes.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct SearchParams {
    /// Case-insensitive substring of the address
    pub city: Option<String>,
    #[param(value_type = Option<f64>)]
    pub latitude: Option<String>,
    #[param(value_type = Option<f64>)]
    pub longitude: Option<String>,
    /// Maximum distance from the point, in meters
    #[param(value_type = Option<f64>)]
    pub distance: Option<String>,
    pub cuisine: Option<String>,
    pub price_range: Option<String>,
    #[param(value_type = Option<f64>)]
    pub min_rating: Option<String>,
}

fn parse_number(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse::<f64>().ok())
        .filter(|n| n.is_finite())
}

fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.is_empty())
}

impl SearchParams {
    /// Check presence and shape of the parameters and build the store query.
    ///
    /// A missing city is reported as not-found rather than bad-request.
    ///
    /// # Errors
    /// [`Error::NotFound`] without a city; [`Error::InvalidInput`] for missing
    /// or non-numeric coordinates, a missing or negative distance, or a
    /// non-numeric minimum rating.
    pub fn into_query(self) -> Result<NearQuery, Error> {
        let city = non_empty(self.city)
            .ok_or_else(|| Error::NotFound("City not provided".to_string()))?;

        let (Some(latitude), Some(longitude)) = (
            parse_number(self.latitude.as_deref()),
            parse_number(self.longitude.as_deref()),
        ) else {
            return Err(Error::InvalidInput(
                "Invalid coordinates. Both latitude and longitude are required.".to_string(),
            ));
        };

        let distance = parse_number(self.distance.as_deref())
            .filter(|d| *d >= 0.0)
            .ok_or_else(|| {
                Error::InvalidInput(
                    "Invalid distance. Distance must be a non-negative value.".to_string(),
                )
            })?;

        let min_rating = match non_empty(self.min_rating) {
            Some(raw) => Some(
                parse_number(Some(&raw))
                    .ok_or_else(|| Error::InvalidInput("Invalid input parameters".to_string()))?,
            ),
            None => None,
        };

        Ok(NearQuery {
            city,
            latitude,
            longitude,
            max_distance_m: distance,
            cuisine: non_empty(self.cuisine),
            price_range: non_empty(self.price_range),
            min_rating,
        })
    }
}

// ============================================================================
// HTTP Handlers
// ============================================================================

/// GET /v1/restaurants/{id} - Fetch one restaurant
#[utoipa::path(
    get,
    path = "/v1/restaurants/{id}",
    tag = "restaurants",
    params(("id" = String, Path, description = "Restaurant identifier")),
    responses(
        (status = 200, description = "Successful response", body = finder_common::restaurant::Restaurant),
        (status = 404, description = "Restaurant not found", body = ApiError),
        (status = 429, description = "Rate limit exceeded", body = ApiError)
    )
)]
pub async fn get_handler(
    service: web::Data<Arc<RestaurantService>>,
    path: web::Path<String>,
) -> HttpResponse {
    match service.get(&path.into_inner()).await {
        Ok(restaurant) => HttpResponse::Ok().json(restaurant),
        Err(err) => error_response(&err),
    }
}

/// POST /v1/restaurants - Create a restaurant
#[utoipa::path(
    post,
    path = "/v1/restaurants",
    tag = "restaurants",
    request_body = finder_common::restaurant::RestaurantInput,
    responses(
        (status = 201, description = "Successful Created", body = finder_common::restaurant::CreatedRestaurant),
        (status = 400, description = "Invalid restaurant payload", body = ApiError),
        (status = 429, description = "Rate limit exceeded", body = ApiError),
        (status = 500, description = "Internal Server Error", body = ApiError)
    )
)]
pub async fn add_handler(
    service: web::Data<Arc<RestaurantService>>,
    body: web::Json<serde_json::Value>,
) -> HttpResponse {
    match service.add(&body).await {
        Ok(created) => HttpResponse::Created().json(created),
        Err(err) => error_response(&err),
    }
}

/// PUT /v1/restaurants/{id} - Replace a restaurant's fields
#[utoipa::path(
    put,
    path = "/v1/restaurants/{id}",
    tag = "restaurants",
    params(("id" = String, Path, description = "Restaurant identifier")),
    request_body = finder_common::restaurant::RestaurantInput,
    responses(
        (status = 200, description = "Successful Update", body = finder_common::restaurant::Restaurant),
        (status = 400, description = "Invalid restaurant payload", body = ApiError),
        (status = 404, description = "Restaurant not found", body = ApiError),
        (status = 429, description = "Rate limit exceeded", body = ApiError),
        (status = 500, description = "Internal Server Error", body = ApiError)
    )
)]
pub async fn update_handler(
    service: web::Data<Arc<RestaurantService>>,
    path: web::Path<String>,
    body: web::Json<serde_json::Value>,
) -> HttpResponse {
    match service.update(&path.into_inner(), &body).await {
        Ok(restaurant) => HttpResponse::Ok().json(restaurant),
        Err(err) => error_response(&err),
    }
}

/// DELETE /v1/restaurants/{id} - Delete a restaurant
#[utoipa::path(
    delete,
    path = "/v1/restaurants/{id}",
    tag = "restaurants",
    params(("id" = String, Path, description = "Restaurant identifier")),
    responses(
        (status = 200, description = "Restaurant deleted", body = finder_common::types::DeletedResponse),
        (status = 404, description = "Restaurant not found", body = ApiError),
        (status = 429, description = "Rate limit exceeded", body = ApiError)
    )
)]
pub async fn delete_handler(
    service: web::Data<Arc<RestaurantService>>,
    path: web::Path<String>,
) -> HttpResponse {
    match service.delete(&path.into_inner()).await {
        Ok(deleted) => HttpResponse::Ok().json(deleted),
        Err(err) => error_response(&err),
    }
}

/// GET /v1/restaurants - Proximity search
#[utoipa::path(
    get,
    path = "/v1/restaurants",
    tag = "restaurants",
    params(SearchParams),
    responses(
        (status = 200, description = "Successful response", body = finder_common::restaurant::SearchResults),
        (status = 400, description = "Invalid coordinates, distance or filters", body = ApiError),
        (status = 404, description = "City not provided", body = ApiError),
        (status = 429, description = "Rate limit exceeded", body = ApiError),
        (status = 500, description = "Internal Server Error", body = ApiError)
    )
)]
pub async fn search_handler(
    service: web::Data<Arc<RestaurantService>>,
    params: web::Query<SearchParams>,
) -> HttpResponse {
    let query = match params.into_inner().into_query() {
        Ok(query) => query,
        Err(err) => return error_response(&err),
    };

    match service.search(&query).await {
        Ok(results) => HttpResponse::Ok().json(results),
        Err(err) => error_response(&err),
    }
}

/// Health check
pub async fn health_handler() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "restaurant-finder",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
