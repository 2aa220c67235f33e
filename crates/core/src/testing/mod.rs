//! Testing utilities and mock implementations for end-to-end tests.
//!
//! This module provides mock implementations of the storage and catalog
//! traits, allowing full sync runs without S3 or the catalog API.
//!
//! # Example
//!
//! ```rust,ignore
//! use lineup_sync_core::testing::{fixtures, MockLineupStore, MockResourceCatalog};
//!
//! let store = MockLineupStore::new();
//! store.put_json("exports/DE_2024-10-09.json", &fixtures::rtl_lineup()).await;
//!
//! let catalog = MockResourceCatalog::new();
//! // Run a SyncJob against both, then inspect catalog.recorded_calls()
//! ```

mod mock_catalog;
mod mock_store;

pub use mock_catalog::{MockResourceCatalog, RecordedCatalogCall};
pub use mock_store::MockLineupStore;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::NaiveDate;
    use serde_json::{json, Value};

    use crate::config::{
        AuthFailurePolicy, CatalogConfig, Config, PublishConfig, RunConfig, StorageConfig,
    };

    /// Folder used by [`config`].
    pub const FOLDER: &str = "exports";

    /// Object key for an export file in the fixture folder.
    pub fn export_key(operator: &str, date: &str) -> String {
        format!("{}/{}_{}.json", FOLDER, operator, date)
    }

    /// Parse a `YYYY-MM-DD` date.
    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("fixture date must be YYYY-MM-DD")
    }

    /// One lineup record as exported upstream.
    pub fn record(epg_id: u64, name: &str, number: u64) -> Value {
        json!({
            "EPG_ID": epg_id,
            "name": name,
            "channelType": "SD",
            "typeDescription": "Free",
            "Channel_Number": number
        })
    }

    /// A single-channel export containing RTL.
    pub fn rtl_lineup() -> Value {
        json!([record(7159, "RTL", 12)])
    }

    /// Configuration pointing at `catalog_url` for every endpoint, with no
    /// pacing and a fixed run date.
    pub fn config(catalog_url: &str, run_date: &str) -> Config {
        Config {
            storage: StorageConfig {
                bucket: "lineups".to_string(),
                folder: FOLDER.to_string(),
                region: None,
                endpoint: None,
            },
            catalog: CatalogConfig {
                auth_url: format!("{}/auth", catalog_url),
                username: "loader".to_string(),
                api_key: "api-key".to_string(),
                resources_url: format!("{}/resources", catalog_url),
                references_url: format!("{}/references", catalog_url),
                tenant_id: uuid::Uuid::from_u128(0xcfd95b7e_3bc7_4006_a4a8_a73a79c71255),
                job_id: "vtv-channel-load".to_string(),
                timeout_secs: 5,
                accept_invalid_certs: false,
                auth_failure: AuthFailurePolicy::Abort,
            },
            publish: PublishConfig {
                operator_delay_ms: 0,
                ..Default::default()
            },
            run: RunConfig {
                date: Some(date(run_date)),
            },
        }
    }
}
