//! Object storage access for lineup exports.
//!
//! This module provides a `LineupStore` trait for listing and fetching the
//! daily export files, the S3 implementation, and the filename contract
//! shared with the upstream export job.

pub mod naming;
mod s3;

pub use naming::{date_token, file_name, filter_by_date, operator_code};
pub use s3::S3LineupStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while reading lineup exports.
///
/// Every variant is fatal for a sync run.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to list objects under '{prefix}': {message}")]
    ListFailed { prefix: String, message: String },

    #[error("Failed to fetch object '{key}': {message}")]
    FetchFailed { key: String, message: String },

    #[error("Failed to parse object '{key}': {message}")]
    ParseError { key: String, message: String },

    #[error("Object not found: {0}")]
    NotFound(String),
}

/// Read access to the bucket holding lineup exports.
#[async_trait]
pub trait LineupStore: Send + Sync {
    /// Human-readable backend name (for logging).
    fn name(&self) -> &str;

    /// List every object key under `prefix`.
    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError>;

    /// Fetch an object and decode its body as JSON.
    async fn fetch_object(&self, key: &str) -> Result<Value, StorageError>;
}

/// Decode an object body as JSON.
pub fn parse_object(key: &str, body: &[u8]) -> Result<Value, StorageError> {
    serde_json::from_slice(body).map_err(|e| StorageError::ParseError {
        key: key.to_string(),
        message: e.to_string(),
    })
}
