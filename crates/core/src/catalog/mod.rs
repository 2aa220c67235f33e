//! Resource catalog integration.
//!
//! The catalog is a graph-shaped asset API: entities are upserted by a
//! caller-supplied unique ID and linked with typed edges. Every call is
//! authorized with a bearer token obtained from a username/API-key
//! exchange.

mod http;
mod types;

pub use http::AiopsClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the resource catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Request timed out.
    #[error("Request timeout")]
    Timeout,

    /// API returned a non-success status.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Token exchange did not produce a token.
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

/// Exchanges credentials for a bearer token.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn obtain_token(&self) -> Result<AuthToken, CatalogError>;
}

/// Write access to the resource catalog.
///
/// Both calls return the HTTP status of a successful response.
#[async_trait]
pub trait ResourceCatalog: Send + Sync {
    /// Human-readable backend name (for logging).
    fn name(&self) -> &str;

    /// Create or update an entity.
    async fn upsert_entity(
        &self,
        token: &AuthToken,
        entity: &EntityUpsert,
    ) -> Result<u16, CatalogError>;

    /// Create a directed edge between two entities.
    async fn create_relationship(
        &self,
        token: &AuthToken,
        edge: &RelationshipEdge,
    ) -> Result<u16, CatalogError>;
}
