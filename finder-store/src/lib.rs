//! Record store adapters for the restaurant finder
//!
//! Provides:
//! - The [`RecordStore`] contract the service layer depends on
//! - [`MongoStore`], backed by a MongoDB collection with a `2dsphere` index
//! - [`InMemoryStore`], a process-local store for development and tests

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
pub mod memory;
pub mod mongo;

pub use backend::{NearQuery, NewRestaurant, RecordStore, RestaurantRecord};
pub use error::{StoreError, StoreErrorCategory, StoreResult};
pub use memory::InMemoryStore;
pub use mongo::MongoStore;
