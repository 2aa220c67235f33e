use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lineup_sync_core::{
    load_config_from_env, validate_config, AiopsClient, S3LineupStore, SyncJob,
};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Selects the log output format (`json` or the default text format)
const LOG_FORMAT_ENV: &str = "LINEUP_SYNC_LOG_FORMAT";

#[tokio::main]
async fn main() {
    init_logging();

    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,lineup_sync_core=info".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var(LOG_FORMAT_ENV).is_ok_and(|f| f.eq_ignore_ascii_case("json")) {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run() -> Result<()> {
    info!("lineup-sync {} starting", VERSION);

    // Load configuration
    let config = load_config_from_env().context("Failed to load configuration")?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    if config.publish.restricted {
        info!(
            "Restricted mode: only channels {:?} will be published",
            config.publish.restricted_channels
        );
    }

    let store = Arc::new(S3LineupStore::new(&config.storage).await);
    info!(
        "Syncing s3://{}/{} into {}",
        store.bucket(),
        config.storage.prefix(),
        config.catalog.resources_url
    );
    let catalog = Arc::new(
        AiopsClient::new(config.catalog.clone()).context("Failed to create catalog client")?,
    );

    let job = SyncJob::new(&config, store, catalog.clone(), catalog);
    let summary = job
        .run()
        .await
        .with_context(|| format!("Lineup sync for {} failed", job.date()))?;

    info!(
        "Published {} operators and {} channels ({} failed calls)",
        summary.operators,
        summary.channels,
        summary.report.total_failures()
    );

    Ok(())
}
