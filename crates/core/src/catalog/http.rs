//! HTTP client for the AIOps resource catalog.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use tracing::debug;

use crate::config::CatalogConfig;

use super::types::{TokenRequest, TokenResponse};
use super::{
    AuthToken, CatalogError, EntityUpsert, RelationshipEdge, ResourceCatalog, TokenProvider,
};

const TENANT_HEADER: &str = "X-TenantID";
const JOB_HEADER: &str = "JobId";

/// AIOps catalog client.
///
/// Holds no token itself; callers obtain one with
/// [`TokenProvider::obtain_token`] and pass it to every write.
pub struct AiopsClient {
    client: Client,
    config: CatalogConfig,
}

impl AiopsClient {
    /// Create a new catalog client.
    pub fn new(config: CatalogConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .build()?;

        Ok(Self { client, config })
    }

    /// Build an authorized JSON POST with the tenant and job headers.
    fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        token: &AuthToken,
        body: &T,
    ) -> RequestBuilder {
        self.client
            .post(url)
            .header(ACCEPT, "application/json")
            .header(TENANT_HEADER, self.config.tenant_id.to_string())
            .header(JOB_HEADER, self.config.job_id.as_str())
            .header(AUTHORIZATION, token.bearer())
            .json(body)
    }
}

async fn send(request: RequestBuilder) -> Result<u16, CatalogError> {
    let response = request.send().await.map_err(map_send_error)?;
    check_status(response).await
}

fn map_send_error(e: reqwest::Error) -> CatalogError {
    if e.is_timeout() {
        CatalogError::Timeout
    } else {
        CatalogError::HttpError(e)
    }
}

/// Turn a non-2xx response into an `ApiError` carrying the body.
async fn check_status(response: Response) -> Result<u16, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(status.as_u16());
    }
    let body = response.text().await.unwrap_or_default();
    Err(CatalogError::ApiError {
        status: status.as_u16(),
        message: body,
    })
}

#[async_trait]
impl TokenProvider for AiopsClient {
    async fn obtain_token(&self) -> Result<AuthToken, CatalogError> {
        let body = TokenRequest {
            username: self.config.username.clone(),
            api_key: self.config.api_key.clone(),
        };

        debug!("Requesting catalog token for user '{}'", self.config.username);

        let response = self
            .client
            .post(&self.config.auth_url)
            .json(&body)
            .send()
            .await
            .map_err(map_send_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::AuthenticationFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.chars().take(200).collect::<String>()
            )));
        }

        let parsed: TokenResponse = response.json().await.map_err(|e| {
            CatalogError::ParseError(format!("Failed to parse token response: {}", e))
        })?;

        match parsed.token {
            Some(token) if !token.is_empty() => Ok(AuthToken::new(token)),
            _ => Err(CatalogError::AuthenticationFailed(
                "token response carried no token".to_string(),
            )),
        }
    }
}

#[async_trait]
impl ResourceCatalog for AiopsClient {
    fn name(&self) -> &str {
        "aiops"
    }

    async fn upsert_entity(
        &self,
        token: &AuthToken,
        entity: &EntityUpsert,
    ) -> Result<u16, CatalogError> {
        debug!("Upserting entity '{}'", entity.unique_id);
        send(self.post_json(&self.config.resources_url, token, entity))
            .await
    }

    async fn create_relationship(
        &self,
        token: &AuthToken,
        edge: &RelationshipEdge,
    ) -> Result<u16, CatalogError> {
        debug!(
            "Creating '{}' edge {} -> {}",
            edge.edge_type, edge.from_unique_id, edge.to_unique_id
        );
        send(self.post_json(&self.config.references_url, token, edge))
            .await
    }
}
