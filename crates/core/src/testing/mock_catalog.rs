//! Mock resource catalog for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::{
    AuthToken, CatalogError, EntityUpsert, RelationshipEdge, ResourceCatalog, TokenProvider,
};

/// A recorded catalog write for test assertions.
#[derive(Debug, Clone)]
pub enum RecordedCatalogCall {
    Entity {
        token: AuthToken,
        entity: EntityUpsert,
    },
    Relationship {
        token: AuthToken,
        edge: RelationshipEdge,
    },
}

impl RecordedCatalogCall {
    /// Compact form: `entity DE_7159_RTL` or `edge DE -> DE_7159_RTL`.
    pub fn describe(&self) -> String {
        match self {
            RecordedCatalogCall::Entity { entity, .. } => format!("entity {}", entity.unique_id),
            RecordedCatalogCall::Relationship { edge, .. } => {
                format!("edge {} -> {}", edge.from_unique_id, edge.to_unique_id)
            }
        }
    }

    /// Token the call was made with.
    pub fn token(&self) -> &AuthToken {
        match self {
            RecordedCatalogCall::Entity { token, .. } => token,
            RecordedCatalogCall::Relationship { token, .. } => token,
        }
    }

    pub fn entity(&self) -> Option<&EntityUpsert> {
        match self {
            RecordedCatalogCall::Entity { entity, .. } => Some(entity),
            RecordedCatalogCall::Relationship { .. } => None,
        }
    }

    pub fn edge(&self) -> Option<&RelationshipEdge> {
        match self {
            RecordedCatalogCall::Entity { .. } => None,
            RecordedCatalogCall::Relationship { edge, .. } => Some(edge),
        }
    }
}

/// Mock implementation of the ResourceCatalog and TokenProvider traits.
///
/// Provides controllable behavior for testing:
/// - Record every write in call order
/// - Fail writes for chosen unique IDs
/// - Control the token exchange outcome
///
/// # Example
///
/// ```rust,ignore
/// let catalog = MockResourceCatalog::new();
/// catalog.fail_unique_id("DE_7159_RTL").await;
///
/// publisher.publish(&token, &lineup).await;
///
/// let calls = catalog.recorded_calls().await;
/// assert_eq!(calls[0].describe(), "entity DE");
/// ```
#[derive(Debug)]
pub struct MockResourceCatalog {
    /// Recorded writes.
    calls: Arc<RwLock<Vec<RecordedCatalogCall>>>,
    /// Entity unique IDs whose upsert fails.
    failing_entities: Arc<RwLock<HashSet<String>>>,
    /// Edge targets whose relationship call fails.
    failing_edges: Arc<RwLock<HashSet<String>>>,
    /// If set, the next write will fail with this error.
    next_error: Arc<RwLock<Option<CatalogError>>>,
    /// Token handed out by the exchange; `None` makes it fail.
    token: Arc<RwLock<Option<String>>>,
    /// Number of token exchanges performed.
    token_requests: Arc<RwLock<usize>>,
}

impl Default for MockResourceCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl MockResourceCatalog {
    /// Create a catalog that accepts everything and issues `mock-token`.
    pub fn new() -> Self {
        Self {
            calls: Arc::new(RwLock::new(Vec::new())),
            failing_entities: Arc::new(RwLock::new(HashSet::new())),
            failing_edges: Arc::new(RwLock::new(HashSet::new())),
            next_error: Arc::new(RwLock::new(None)),
            token: Arc::new(RwLock::new(Some("mock-token".to_string()))),
            token_requests: Arc::new(RwLock::new(0)),
        }
    }

    // =========================================================================
    // Token Exchange
    // =========================================================================

    /// Token the exchange returns; `None` makes the exchange fail.
    pub async fn set_token(&self, token: Option<&str>) {
        *self.token.write().await = token.map(str::to_string);
    }

    /// Number of token exchanges performed.
    pub async fn token_requests(&self) -> usize {
        *self.token_requests.read().await
    }

    // =========================================================================
    // Call Recording
    // =========================================================================

    /// Get all recorded writes, in call order.
    pub async fn recorded_calls(&self) -> Vec<RecordedCatalogCall> {
        self.calls.read().await.clone()
    }

    /// Recorded entity upserts only.
    pub async fn recorded_entities(&self) -> Vec<EntityUpsert> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| c.entity().cloned())
            .collect()
    }

    /// Recorded relationship calls only.
    pub async fn recorded_edges(&self) -> Vec<RelationshipEdge> {
        self.calls
            .read()
            .await
            .iter()
            .filter_map(|c| c.edge().cloned())
            .collect()
    }

    /// Clear recorded writes.
    pub async fn clear_recorded(&self) {
        self.calls.write().await.clear();
    }

    // =========================================================================
    // Error Injection
    // =========================================================================

    /// Make every upsert of `unique_id` fail with a 500.
    pub async fn fail_unique_id(&self, unique_id: &str) {
        self.failing_entities
            .write()
            .await
            .insert(unique_id.to_string());
    }

    /// Make every edge pointing at `unique_id` fail with a 500.
    pub async fn fail_edge_to(&self, unique_id: &str) {
        self.failing_edges
            .write()
            .await
            .insert(unique_id.to_string());
    }

    /// Configure the next write to fail with the given error.
    pub async fn set_next_error(&self, error: CatalogError) {
        *self.next_error.write().await = Some(error);
    }

    /// Take the next error if set.
    async fn take_error(&self) -> Option<CatalogError> {
        self.next_error.write().await.take()
    }
}

fn server_error(what: &str) -> CatalogError {
    CatalogError::ApiError {
        status: 500,
        message: format!("mock failure for {}", what),
    }
}

#[async_trait]
impl TokenProvider for MockResourceCatalog {
    async fn obtain_token(&self) -> Result<AuthToken, CatalogError> {
        *self.token_requests.write().await += 1;
        match self.token.read().await.as_ref() {
            Some(token) => Ok(AuthToken::new(token.clone())),
            None => Err(CatalogError::AuthenticationFailed(
                "HTTP 401: invalid credentials".to_string(),
            )),
        }
    }
}

#[async_trait]
impl ResourceCatalog for MockResourceCatalog {
    fn name(&self) -> &str {
        "mock"
    }

    async fn upsert_entity(
        &self,
        token: &AuthToken,
        entity: &EntityUpsert,
    ) -> Result<u16, CatalogError> {
        self.calls.write().await.push(RecordedCatalogCall::Entity {
            token: token.clone(),
            entity: entity.clone(),
        });

        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        if self.failing_entities.read().await.contains(&entity.unique_id) {
            return Err(server_error(&entity.unique_id));
        }
        Ok(200)
    }

    async fn create_relationship(
        &self,
        token: &AuthToken,
        edge: &RelationshipEdge,
    ) -> Result<u16, CatalogError> {
        self.calls.write().await.push(RecordedCatalogCall::Relationship {
            token: token.clone(),
            edge: edge.clone(),
        });

        if let Some(error) = self.take_error().await {
            return Err(error);
        }
        if self.failing_edges.read().await.contains(&edge.to_unique_id) {
            return Err(server_error(&edge.to_unique_id));
        }
        Ok(201)
    }
}
