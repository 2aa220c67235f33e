//! Sync run lifecycle integration tests.
//!
//! These tests drive complete runs through the sync job using the in-memory
//! store and catalog:
//! authenticate -> list -> filter by date -> fetch -> aggregate -> publish

use std::sync::Arc;

use serde_json::json;

use lineup_sync_core::{
    testing::{fixtures, MockLineupStore, MockResourceCatalog},
    AuthFailurePolicy, Config, LineupError, StorageError, SyncError, SyncJob,
};

/// Test helper wiring a job to the mocks.
struct TestHarness {
    store: Arc<MockLineupStore>,
    catalog: Arc<MockResourceCatalog>,
    config: Config,
}

impl TestHarness {
    fn new(run_date: &str) -> Self {
        Self {
            store: Arc::new(MockLineupStore::new()),
            catalog: Arc::new(MockResourceCatalog::new()),
            config: fixtures::config("http://catalog.invalid", run_date),
        }
    }

    fn job(&self) -> SyncJob {
        SyncJob::new(
            &self.config,
            self.store.clone(),
            self.catalog.clone(),
            self.catalog.clone(),
        )
    }

    async fn calls(&self) -> Vec<String> {
        self.catalog
            .recorded_calls()
            .await
            .iter()
            .map(|c| c.describe())
            .collect()
    }
}

#[tokio::test]
async fn test_single_export_is_published() {
    let harness = TestHarness::new("2024-10-09");
    harness
        .store
        .put_json(&fixtures::export_key("DE", "2024-10-09"), &fixtures::rtl_lineup())
        .await;

    let summary = harness.job().run().await.unwrap();

    assert_eq!(
        harness.calls().await,
        vec![
            "entity DE",
            "entity DE_7159_RTL",
            "edge DE -> DE_7159_RTL"
        ]
    );
    assert!(harness
        .catalog
        .recorded_calls()
        .await
        .iter()
        .all(|c| c.token().as_str() == "mock-token"));
    assert_eq!(harness.catalog.token_requests().await, 1);

    assert_eq!(summary.files_matched, 1);
    assert_eq!(summary.operators, 1);
    assert_eq!(summary.channels, 1);
    assert_eq!(summary.report.total_calls(), 3);
    assert_eq!(summary.report.total_failures(), 0);
}

#[tokio::test]
async fn test_no_export_for_date_publishes_nothing() {
    let harness = TestHarness::new("2024-10-10");
    harness
        .store
        .put_json(&fixtures::export_key("DE", "2024-10-09"), &fixtures::rtl_lineup())
        .await;

    let summary = harness.job().run().await.unwrap();

    assert!(harness.calls().await.is_empty());
    assert!(harness.store.fetched_keys().await.is_empty());
    assert_eq!(summary.files_listed, 1);
    assert_eq!(summary.files_matched, 0);
    assert_eq!(summary.report.total_calls(), 0);
}

#[tokio::test]
async fn test_operators_and_channels_keep_first_encounter_order() {
    let harness = TestHarness::new("2024-10-09");
    harness
        .store
        .put_json(&fixtures::export_key("DE", "2024-10-09"), &fixtures::rtl_lineup())
        .await;
    harness
        .store
        .put_json(
            &fixtures::export_key("NL", "2024-10-09"),
            &json!([fixtures::record(1, "NPO1", 1)]),
        )
        .await;
    // A second DE export renames RTL and adds ZDF.
    harness
        .store
        .put_json(
            "exports/DE_2024-10-09_late.json",
            &json!([
                fixtures::record(7159, "RTL Television", 12),
                fixtures::record(8, "ZDF", 2)
            ]),
        )
        .await;

    let summary = harness.job().run().await.unwrap();

    assert_eq!(
        harness.calls().await,
        vec![
            "entity DE",
            "entity DE_7159_RTL Television",
            "edge DE -> DE_7159_RTL Television",
            "entity DE_8_ZDF",
            "edge DE -> DE_8_ZDF",
            "entity NL",
            "entity NL_1_NPO1",
            "edge NL -> NL_1_NPO1"
        ]
    );
    assert_eq!(summary.operators, 2);
    assert_eq!(summary.channels, 3);
    assert_eq!(summary.overwrites, 1);
}

#[tokio::test]
async fn test_restricted_mode_publishes_allowed_channels_only() {
    let mut harness = TestHarness::new("2024-10-09");
    harness.config.publish.restricted = true;
    harness
        .store
        .put_json(
            &fixtures::export_key("DE", "2024-10-09"),
            &json!([
                fixtures::record(7159, "RTL", 12),
                fixtures::record(9999, "Other", 99)
            ]),
        )
        .await;

    let summary = harness.job().run().await.unwrap();

    assert_eq!(
        harness.calls().await,
        vec![
            "entity DE",
            "entity DE_7159_RTL",
            "edge DE -> DE_7159_RTL"
        ]
    );
    assert_eq!(summary.report.skipped_channels, 1);
}

#[tokio::test]
async fn test_restricted_mode_still_sends_operator() {
    let mut harness = TestHarness::new("2024-10-09");
    harness.config.publish.restricted = true;
    harness
        .store
        .put_json(
            &fixtures::export_key("NL", "2024-10-09"),
            &json!([fixtures::record(1, "NPO1", 1)]),
        )
        .await;

    harness.job().run().await.unwrap();

    assert_eq!(harness.calls().await, vec!["entity NL"]);
}

#[tokio::test]
async fn test_invalid_records_are_skipped() {
    let harness = TestHarness::new("2024-10-09");
    harness
        .store
        .put_json(
            &fixtures::export_key("DE", "2024-10-09"),
            &json!([
                "not a record",
                {"name": "No id"},
                fixtures::record(7159, "RTL", 12)
            ]),
        )
        .await;

    let summary = harness.job().run().await.unwrap();

    assert_eq!(summary.skipped_records, 2);
    assert_eq!(summary.channels, 1);
    assert_eq!(harness.calls().await.len(), 3);
}

#[tokio::test]
async fn test_unnamed_channel_keeps_undefined_segment() {
    let harness = TestHarness::new("2024-10-09");
    harness
        .store
        .put_json(
            &fixtures::export_key("DE", "2024-10-09"),
            &json!([{"EPG_ID": 7159, "Channel_Number": 12}]),
        )
        .await;

    harness.job().run().await.unwrap();

    assert_eq!(
        harness.calls().await,
        vec![
            "entity DE",
            "entity DE_7159_undefined",
            "edge DE -> DE_7159_undefined"
        ]
    );
    let entities = harness.catalog.recorded_entities().await;
    assert!(entities[1].name.is_none());
}

#[tokio::test]
async fn test_publish_failures_do_not_abort_the_run() {
    let harness = TestHarness::new("2024-10-09");
    harness.catalog.fail_unique_id("DE").await;
    harness.catalog.fail_edge_to("DE_7159_RTL").await;
    harness
        .store
        .put_json(&fixtures::export_key("DE", "2024-10-09"), &fixtures::rtl_lineup())
        .await;
    harness
        .store
        .put_json(
            &fixtures::export_key("NL", "2024-10-09"),
            &json!([fixtures::record(1, "NPO1", 1)]),
        )
        .await;

    let summary = harness.job().run().await.unwrap();

    assert_eq!(harness.calls().await.len(), 6);
    assert_eq!(summary.report.operators.failed, 1);
    assert_eq!(summary.report.operators.succeeded, 1);
    assert_eq!(summary.report.edges.failed, 1);
    assert_eq!(summary.report.total_failures(), 2);
    assert_eq!(summary.report.total_calls(), 6);
}

#[tokio::test]
async fn test_listing_failure_aborts_before_publishing() {
    let harness = TestHarness::new("2024-10-09");
    harness
        .store
        .set_next_list_error(StorageError::ListFailed {
            prefix: "exports/".to_string(),
            message: "access denied".to_string(),
        })
        .await;

    let result = harness.job().run().await;

    assert!(matches!(
        result,
        Err(SyncError::Storage(StorageError::ListFailed { .. }))
    ));
    assert!(harness.calls().await.is_empty());
}

#[tokio::test]
async fn test_fetch_failure_aborts_before_publishing() {
    let harness = TestHarness::new("2024-10-09");
    let failing = fixtures::export_key("NL", "2024-10-09");
    harness
        .store
        .put_json(&fixtures::export_key("DE", "2024-10-09"), &fixtures::rtl_lineup())
        .await;
    harness.store.put_json(&failing, &json!([])).await;
    harness.store.fail_key(&failing).await;

    let result = harness.job().run().await;

    assert!(matches!(
        result,
        Err(SyncError::Storage(StorageError::FetchFailed { .. }))
    ));
    // The DE export was read, but nothing reached the catalog.
    assert_eq!(harness.store.fetched_keys().await.len(), 2);
    assert!(harness.calls().await.is_empty());
}

#[tokio::test]
async fn test_malformed_export_aborts_the_run() {
    let harness = TestHarness::new("2024-10-09");
    harness
        .store
        .put_raw(&fixtures::export_key("DE", "2024-10-09"), "[{\"EPG_ID\": 1,")
        .await;

    let result = harness.job().run().await;

    assert!(matches!(
        result,
        Err(SyncError::Storage(StorageError::ParseError { .. }))
    ));
    assert!(harness.calls().await.is_empty());
}

#[tokio::test]
async fn test_non_array_export_aborts_the_run() {
    let harness = TestHarness::new("2024-10-09");
    harness
        .store
        .put_json(
            &fixtures::export_key("DE", "2024-10-09"),
            &json!({"EPG_ID": 7159, "name": "RTL"}),
        )
        .await;

    let result = harness.job().run().await;

    assert!(matches!(
        result,
        Err(SyncError::Lineup(LineupError::NotAnArray { .. }))
    ));
}

#[tokio::test]
async fn test_auth_failure_with_continue_policy_publishes_unauthenticated() {
    let mut harness = TestHarness::new("2024-10-09");
    harness.config.catalog.auth_failure = AuthFailurePolicy::Continue;
    harness.catalog.set_token(None).await;
    harness
        .store
        .put_json(&fixtures::export_key("DE", "2024-10-09"), &fixtures::rtl_lineup())
        .await;

    let summary = harness.job().run().await.unwrap();

    let calls = harness.catalog.recorded_calls().await;
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c.token().is_empty()));
    assert_eq!(summary.report.total_calls(), 3);
}

#[tokio::test]
async fn test_auth_failure_aborts_before_listing() {
    let harness = TestHarness::new("2024-10-09");
    harness.catalog.set_token(None).await;
    harness
        .store
        .put_json(&fixtures::export_key("DE", "2024-10-09"), &fixtures::rtl_lineup())
        .await;

    let result = harness.job().run().await;

    assert!(matches!(result, Err(SyncError::Auth(_))));
    assert!(harness.store.fetched_keys().await.is_empty());
    assert!(harness.calls().await.is_empty());
}
