//! Remote retrieval of entity documents.
//!
//! The cache only needs raw bytes plus a status code for a name; the
//! transport behind that is pluggable through [`EntityFetcher`].

pub mod http;

use async_trait::async_trait;

use crate::entity::name::EntityName;
use crate::error::Result;

pub use http::HttpFetcher;

/// Raw response for one entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    /// HTTP-style status code
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Read-only retrieval of an entity's document by name.
///
/// An `Err` means no response arrived at all; a non-success status is
/// reported through [`FetchResponse::status`].
#[async_trait]
pub trait EntityFetcher: Send + Sync {
    async fn fetch(&self, name: &EntityName) -> Result<FetchResponse>;
}
