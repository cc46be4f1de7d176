//! Entity names, documents and the entity cache.

pub mod cache;
pub mod document;
pub mod name;

pub use cache::{CacheState, EntityCache};
pub use document::{ComponentRef, DocumentParser, Entity, EntityDocument, JsonParser};
pub use name::EntityName;
