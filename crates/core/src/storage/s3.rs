//! S3 lineup store.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::StorageConfig;

use super::{parse_object, LineupStore, StorageError};

/// Lineup store backed by an S3 bucket.
///
/// Credentials come from the standard AWS provider chain.
#[derive(Clone)]
pub struct S3LineupStore {
    client: Client,
    bucket: String,
}

impl S3LineupStore {
    /// Create a store for the configured bucket.
    pub async fn new(config: &StorageConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint) = &config.endpoint {
            loader = loader.endpoint_url(endpoint);
        }

        let shared = loader.load().await;
        let mut s3_config = aws_sdk_s3::config::Builder::from(&shared);
        if config.endpoint.is_some() {
            s3_config = s3_config.force_path_style(true);
        }

        Self::with_client(Client::from_conf(s3_config.build()), config.bucket.clone())
    }

    /// Wrap an already configured client.
    pub fn with_client(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Bucket this store reads from.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl LineupStore for S3LineupStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn list_objects(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let mut req = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix);
            if let Some(t) = token.take() {
                req = req.continuation_token(t);
            }
            let resp = req.send().await.map_err(|e| StorageError::ListFailed {
                prefix: prefix.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

            if let Some(contents) = resp.contents {
                keys.extend(contents.into_iter().filter_map(|obj| obj.key));
            }

            if resp.is_truncated.unwrap_or(false) {
                token = resp.next_continuation_token;
                if token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }

        debug!(
            "Listed {} objects in s3://{}/{}",
            keys.len(),
            self.bucket,
            prefix
        );
        Ok(keys)
    }

    async fn fetch_object(&self, key: &str) -> Result<Value, StorageError> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| match e.into_service_error() {
                GetObjectError::NoSuchKey(_) => StorageError::NotFound(key.to_string()),
                other => StorageError::FetchFailed {
                    key: key.to_string(),
                    message: DisplayErrorContext(&other).to_string(),
                },
            })?;

        let body = resp
            .body
            .collect()
            .await
            .map_err(|e| StorageError::FetchFailed {
                key: key.to_string(),
                message: e.to_string(),
            })?
            .into_bytes();

        debug!("Fetched {} bytes from s3://{}/{}", body.len(), self.bucket, key);
        parse_object(key, &body)
    }
}
