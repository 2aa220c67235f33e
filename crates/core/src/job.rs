//! One sync run: authenticate, collect the day's exports, publish them.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::catalog::{AuthToken, CatalogError, ResourceCatalog, TokenProvider};
use crate::config::{AuthFailurePolicy, Config, SanitizedConfig};
use crate::lineup::{LineupAggregator, LineupError, RunDataset};
use crate::publisher::{LineupPublisher, PublishReport};
use crate::storage::{filter_by_date, LineupStore, StorageError};

/// Errors that abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Could not obtain catalog token: {0}")]
    Auth(#[source] CatalogError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Lineup(#[from] LineupError),
}

/// Exports collected for the target date.
#[derive(Debug, Clone)]
pub struct CollectedLineups {
    pub dataset: RunDataset,
    pub files_listed: usize,
    pub files_matched: usize,
}

/// What a completed run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub files_listed: usize,
    pub files_matched: usize,
    pub operators: usize,
    pub channels: usize,
    pub overwrites: usize,
    pub skipped_records: usize,
    pub report: PublishReport,
}

/// The daily lineup sync.
pub struct SyncJob {
    store: Arc<dyn LineupStore>,
    tokens: Arc<dyn TokenProvider>,
    publisher: LineupPublisher,
    prefix: String,
    date: NaiveDate,
    auth_failure: AuthFailurePolicy,
}

impl SyncJob {
    pub fn new(
        config: &Config,
        store: Arc<dyn LineupStore>,
        tokens: Arc<dyn TokenProvider>,
        catalog: Arc<dyn ResourceCatalog>,
    ) -> Self {
        debug!(
            "Sync job configuration: {}",
            serde_json::to_string(&SanitizedConfig::from(config)).unwrap_or_default()
        );

        info!(
            store = store.name(),
            catalog = catalog.name(),
            prefix = %config.storage.prefix(),
            "Sync job ready"
        );

        Self {
            store,
            tokens,
            publisher: LineupPublisher::new(catalog, config.publish.clone()),
            prefix: config.storage.prefix(),
            date: config.run.target_date(),
            auth_failure: config.catalog.auth_failure,
        }
    }

    /// Date whose exports this job syncs.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Obtain the bearer token, applying the configured failure policy.
    pub async fn authenticate(&self) -> Result<AuthToken, SyncError> {
        match self.tokens.obtain_token().await {
            Ok(token) => {
                info!("Obtained catalog token");
                Ok(token)
            }
            Err(e) => match self.auth_failure {
                AuthFailurePolicy::Abort => Err(SyncError::Auth(e)),
                AuthFailurePolicy::Continue => {
                    error!("Error obtaining catalog token: {}", e);
                    warn!("Continuing with an empty token; catalog calls will be unauthorized");
                    Ok(AuthToken::empty())
                }
            },
        }
    }

    /// List, filter, fetch and aggregate the exports for the target date.
    ///
    /// Any storage or parse failure aborts the collection.
    pub async fn collect(&self) -> Result<CollectedLineups, SyncError> {
        let keys = self.store.list_objects(&self.prefix).await.map_err(|e| {
            error!("Error listing files: {}", e);
            e
        })?;
        let matched = filter_by_date(&keys, self.date);
        info!(
            listed = keys.len(),
            matched = matched.len(),
            "Found lineup files for {}",
            self.date
        );

        let mut aggregator = LineupAggregator::new();
        for key in &matched {
            let content = self.store.fetch_object(key).await.map_err(|e| {
                error!("Error reading file {}: {}", key, e);
                e
            })?;
            aggregator.add_file(key, content)?;
        }

        Ok(CollectedLineups {
            dataset: aggregator.finish(),
            files_listed: keys.len(),
            files_matched: matched.len(),
        })
    }

    /// Run the whole job once.
    pub async fn run(&self) -> Result<RunSummary, SyncError> {
        let token = self.authenticate().await?;

        info!("Looking for lineup files with date: {}", self.date);
        let collected = self.collect().await?;
        let dataset = &collected.dataset;

        if dataset.is_empty() {
            warn!("No lineup data for {}, nothing to publish", self.date);
        }

        let report = self.publisher.publish_all(&token, dataset).await;

        let summary = RunSummary {
            date: self.date,
            files_listed: collected.files_listed,
            files_matched: collected.files_matched,
            operators: dataset.operator_count(),
            channels: dataset.channel_count(),
            overwrites: dataset.overwrites,
            skipped_records: dataset.skipped_records,
            report,
        };

        info!(
            date = %summary.date,
            files = summary.files_matched,
            operators = summary.operators,
            channels = summary.channels,
            overwrites = summary.overwrites,
            calls = report.total_calls(),
            failed = report.total_failures(),
            skipped_channels = report.skipped_channels,
            "Lineup sync finished"
        );

        Ok(summary)
    }
}
