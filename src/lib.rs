//! CIM - async client for City Information Model entities.
//!
//! Entities are fetched by name on first use, cached for the life of the
//! process, and shared between concurrent requests. Resource ledgers can be
//! rolled up through an entity's component tree.

mod defaults;
pub mod error;

pub mod entity;
pub mod fetch;
pub mod resources;

pub use error::{Error, Result};

pub use entity::cache::{CacheState, EntityCache};
pub use entity::document::{ComponentRef, DocumentParser, Entity, EntityDocument, JsonParser};
pub use entity::name::EntityName;

pub use fetch::{EntityFetcher, FetchResponse, HttpFetcher};

pub use resources::aggregator::{CycleDiagnostic, ResourceAggregator, Rollup};
pub use resources::entry::{ResourceEntry, ResourceLedger};
pub use resources::merge::add_resources;
pub use resources::units::conversion_factor;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
