//! Restaurant Finder REST API
//!
//! Provides the HTTP surface of the restaurant finder:
//! - CRUD on `/v1/restaurants/{id}` and creation on `/v1/restaurants`
//! - Proximity search by city substring, point and radius
//! - Per-IP fixed-window rate limiting
//! - OpenAPI documentation served through Swagger UI

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod handlers;
pub mod openapi;
pub mod ratelimit;
pub mod server;
pub mod service;

pub use handlers::SearchParams;
pub use openapi::{api_doc, ApiDoc};
pub use ratelimit::{RateLimitConfig, RateLimitResult, RateLimiter};
pub use server::{configure, RestServer};
pub use service::RestaurantService;
