pub mod catalog;
pub mod config;
pub mod job;
pub mod lineup;
pub mod publisher;
pub mod storage;
pub mod testing;

pub use catalog::{
    AiopsClient, AuthToken, CatalogError, EntityUpsert, RelationshipEdge, ResourceCatalog,
    TokenProvider,
};
pub use config::{
    load_config, load_config_from_env, load_config_from_str, validate_config, AuthFailurePolicy,
    CatalogConfig, Config, ConfigError, PublishConfig, RunConfig, SanitizedConfig, StorageConfig,
};
pub use job::{CollectedLineups, RunSummary, SyncError, SyncJob};
pub use lineup::{
    aggregate, ChannelAttributes, LineupAggregator, LineupError, LineupRecord, OperatorLineup,
    RunDataset,
};
pub use publisher::{CallStats, LineupPublisher, PublishReport};
pub use storage::{filter_by_date, operator_code, LineupStore, S3LineupStore, StorageError};
