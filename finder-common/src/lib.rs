//! Restaurant Finder Common Types and Utilities
//!
//! Shared domain types, configuration, and error handling for the restaurant
//! finder services.

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod restaurant;
pub mod types;

pub use config::FinderConfig;
pub use error::{Error, Result};
pub use restaurant::{derive_location, validate_restaurant, GeoPoint, RestaurantInput};
