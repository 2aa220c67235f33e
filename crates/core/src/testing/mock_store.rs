//! Mock lineup store for testing.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::storage::{parse_object, LineupStore, StorageError};

/// In-memory implementation of the LineupStore trait.
///
/// Objects are listed in insertion order, which lets tests pin the
/// file-processing order. Bodies are kept as raw bytes and decoded on
/// fetch, so malformed JSON can be staged too.
#[derive(Debug)]
pub struct MockLineupStore {
    /// Stored objects, in listing order.
    objects: Arc<RwLock<Vec<(String, Vec<u8>)>>>,
    /// Keys fetched so far, in order.
    fetched: Arc<RwLock<Vec<String>>>,
    /// Keys whose fetch fails.
    failing_keys: Arc<RwLock<HashSet<String>>>,
    /// If set, the next listing will fail with this error.
    next_list_error: Arc<RwLock<Option<StorageError>>>,
}

impl Default for MockLineupStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockLineupStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            objects: Arc::new(RwLock::new(Vec::new())),
            fetched: Arc::new(RwLock::new(Vec::new())),
            failing_keys: Arc::new(RwLock::new(HashSet::new())),
            next_list_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Store a JSON object, replacing any object with the same key.
    pub async fn put_json(&self, key: &str, body: &Value) {
        self.put_raw(key, body.to_string().into_bytes()).await;
    }

    /// Store raw bytes, replacing any object with the same key.
    pub async fn put_raw(&self, key: &str, body: impl Into<Vec<u8>>) {
        let body = body.into();
        let mut objects = self.objects.write().await;
        match objects.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = body,
            None => objects.push((key.to_string(), body)),
        }
    }

    /// Keys fetched so far, in order.
    pub async fn fetched_keys(&self) -> Vec<String> {
        self.fetched.read().await.clone()
    }

    /// Make fetching `key` fail.
    pub async fn fail_key(&self, key: &str) {
        self.failing_keys.write().await.insert(key.to_string());
    }

    /// Configure the next listing to fail with the given error.
    pub async fn set_next_list_error(&self, error: StorageError) {
        *self.next_list_error.write().await = Some(error);
    }
}

#[async_trait]
impl LineupStore for MockLineupStore {
    fn name(&self) -> &str {
        "mock"
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        if let Some(error) = self.next_list_error.write().await.take() {
            return Err(error);
        }
        Ok(self
            .objects
            .read()
            .await
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    async fn fetch_object(&self, key: &str) -> Result<Value, StorageError> {
        self.fetched.write().await.push(key.to_string());

        if self.failing_keys.read().await.contains(key) {
            return Err(StorageError::FetchFailed {
                key: key.to_string(),
                message: "mock fetch failure".to_string(),
            });
        }

        let objects = self.objects.read().await;
        let (_, body) = objects
            .iter()
            .find(|(k, _)| k == key)
            .ok_or_else(|| StorageError::NotFound(key.to_string()))?;
        parse_object(key, body)
    }
}
