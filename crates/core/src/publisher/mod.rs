//! Publishes operator lineups to the resource catalog.
//!
//! For every operator the publisher sends, strictly in order and one call at
//! a time: the operator upsert, then for each channel its upsert followed
//! immediately by the `contains` edge from the operator. Failed calls are
//! logged and counted; they never stop the pass.

mod report;

pub use report::{CallStats, PublishReport};

use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::catalog::{AuthToken, EntityUpsert, RelationshipEdge, ResourceCatalog};
use crate::config::PublishConfig;
use crate::lineup::{OperatorLineup, RunDataset};

/// Sequential, best-effort lineup publisher.
pub struct LineupPublisher {
    catalog: Arc<dyn ResourceCatalog>,
    config: PublishConfig,
}

impl LineupPublisher {
    pub fn new(catalog: Arc<dyn ResourceCatalog>, config: PublishConfig) -> Self {
        Self { catalog, config }
    }

    /// Pause inserted between two operators.
    pub fn operator_delay(&self) -> Duration {
        Duration::from_millis(self.config.operator_delay_ms)
    }

    /// Whether restricted mode lets a channel through.
    fn allows(&self, channel_name: Option<&str>) -> bool {
        if !self.config.restricted {
            return true;
        }
        channel_name.is_some_and(|name| self.config.restricted_channels.iter().any(|c| c == name))
    }

    /// Publish every operator in the dataset, pausing between operators.
    pub async fn publish_all(&self, token: &AuthToken, dataset: &RunDataset) -> PublishReport {
        let mut report = PublishReport::default();
        let delay = self.operator_delay();

        for (index, lineup) in dataset.operators().enumerate() {
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let operator_report = self.publish(token, lineup).await;
            report.merge(&operator_report);
        }

        report
    }

    /// Publish one operator and its channels.
    pub async fn publish(&self, token: &AuthToken, lineup: &OperatorLineup) -> PublishReport {
        let mut report = PublishReport::default();
        let code = lineup.code();

        let result = self
            .catalog
            .upsert_entity(token, &EntityUpsert::operator(code))
            .await;
        match &result {
            Ok(status) => info!(operator = %code, status, "Sent operator entity"),
            Err(e) => error!(operator = %code, "Error sending operator entity: {}", e),
        }
        report.operators.record(&result);

        for (channel_id, attributes) in lineup.channels() {
            let entity = EntityUpsert::channel(code, channel_id, attributes);
            let channel_name = entity.name.as_deref();

            if channel_name.is_none() {
                warn!(
                    operator = %code,
                    channel_id = %channel_id,
                    "Channel has no name, unique ID is '{}'",
                    entity.unique_id
                );
            }

            if !self.allows(channel_name) {
                report.skipped_channels += 1;
                warn!(
                    operator = %code,
                    channel = channel_name.unwrap_or_default(),
                    "Restricted mode: not publishing channel"
                );
                continue;
            }

            let result = self.catalog.upsert_entity(token, &entity).await;
            match &result {
                Ok(status) => info!(
                    operator = %code,
                    channel = channel_name.unwrap_or_default(),
                    status,
                    "Sent channel entity"
                ),
                Err(e) => error!(
                    operator = %code,
                    channel = channel_name.unwrap_or_default(),
                    "Error sending channel entity: {}",
                    e
                ),
            }
            report.channels.record(&result);

            let edge = RelationshipEdge::contains(code, &entity.unique_id);
            let result = self.catalog.create_relationship(token, &edge).await;
            match &result {
                Ok(status) => info!(
                    operator = %code,
                    channel = %entity.unique_id,
                    status,
                    "Created relation"
                ),
                Err(e) => error!(
                    operator = %code,
                    channel = %entity.unique_id,
                    "Error creating relation: {}",
                    e
                ),
            }
            report.edges.record(&result);
        }

        report
    }
}
