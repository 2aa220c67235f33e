use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub publish: PublishConfig,
    #[serde(default)]
    pub run: RunConfig,
}

/// Object storage holding the daily lineup exports
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Bucket name.
    pub bucket: String,
    /// Folder inside the bucket; objects are listed under `{folder}/`.
    pub folder: String,
    /// Region override (falls back to the AWS default chain).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Endpoint override for S3-compatible stores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

impl StorageConfig {
    /// Listing prefix for the lineup folder.
    pub fn prefix(&self) -> String {
        format!("{}/", self.folder.trim_end_matches('/'))
    }
}

/// Resource catalog (entity/relationship API) configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    /// Token exchange endpoint.
    pub auth_url: String,
    /// Username sent to the token exchange.
    pub username: String,
    /// API key sent to the token exchange.
    pub api_key: String,
    /// Entity upsert endpoint.
    pub resources_url: String,
    /// Relationship endpoint.
    pub references_url: String,
    /// Sent as `X-TenantID` on every catalog call.
    #[serde(default = "default_tenant_id")]
    pub tenant_id: Uuid,
    /// Sent as `JobId` on every catalog call.
    #[serde(default = "default_job_id")]
    pub job_id: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u32,
    /// Skip TLS certificate verification.
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// What to do when the token exchange fails.
    #[serde(default)]
    pub auth_failure: AuthFailurePolicy,
}

fn default_tenant_id() -> Uuid {
    Uuid::from_u128(0xcfd95b7e_3bc7_4006_a4a8_a73a79c71255)
}

fn default_job_id() -> String {
    "vtv-channel-load".to_string()
}

fn default_timeout() -> u32 {
    30
}

/// Behaviour when no bearer token can be obtained.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailurePolicy {
    /// Stop the run before touching storage.
    #[default]
    Abort,
    /// Log and publish with an empty bearer token.
    Continue,
}

/// Publishing behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PublishConfig {
    /// Pause between two operators, in milliseconds.
    #[serde(default = "default_operator_delay_ms")]
    pub operator_delay_ms: u64,
    /// Only publish channels listed in `restricted_channels`.
    #[serde(default)]
    pub restricted: bool,
    /// Channel names let through in restricted mode.
    #[serde(default = "default_restricted_channels")]
    pub restricted_channels: Vec<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            operator_delay_ms: default_operator_delay_ms(),
            restricted: false,
            restricted_channels: default_restricted_channels(),
        }
    }
}

fn default_operator_delay_ms() -> u64 {
    1000
}

fn default_restricted_channels() -> Vec<String> {
    vec!["RTL".to_string(), "DAZN 2 (Sky)".to_string()]
}

/// Per-invocation settings
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RunConfig {
    /// Export date to sync; today (UTC) when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl RunConfig {
    /// Resolve the date this run targets.
    pub fn target_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

/// Sanitized config for logging (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub storage: StorageConfig,
    pub catalog: SanitizedCatalogConfig,
    pub publish: PublishConfig,
    pub run: RunConfig,
}

/// Sanitized catalog config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    pub auth_url: String,
    pub username: String,
    pub api_key_configured: bool,
    pub resources_url: String,
    pub references_url: String,
    pub tenant_id: Uuid,
    pub job_id: String,
    pub timeout_secs: u32,
    pub accept_invalid_certs: bool,
    pub auth_failure: AuthFailurePolicy,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let c = &config.catalog;
        Self {
            storage: config.storage.clone(),
            catalog: SanitizedCatalogConfig {
                auth_url: c.auth_url.clone(),
                username: c.username.clone(),
                api_key_configured: !c.api_key.is_empty(),
                resources_url: c.resources_url.clone(),
                references_url: c.references_url.clone(),
                tenant_id: c.tenant_id,
                job_id: c.job_id.clone(),
                timeout_secs: c.timeout_secs,
                accept_invalid_certs: c.accept_invalid_certs,
                auth_failure: c.auth_failure,
            },
            publish: config.publish.clone(),
            run: config.run.clone(),
        }
    }
}
