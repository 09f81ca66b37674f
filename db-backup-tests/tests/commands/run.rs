//! Tests for a full run
//!
//! A run executes one request and reports its artifacts or its error.

use rstest::rstest;
use test_utils::*;

#[rstest]
#[case(false, false, vec![RunState::Idle, RunState::Connecting, RunState::Connected, RunState::Exporting, RunState::Completed])]
#[case(true, false, vec![RunState::Idle, RunState::Connecting, RunState::Connected, RunState::Exporting, RunState::Compressing, RunState::Completed])]
#[case(false, true, vec![RunState::Idle, RunState::Connecting, RunState::Connected, RunState::Exporting, RunState::Uploading, RunState::Completed])]
#[case(true, true, vec![RunState::Idle, RunState::Connecting, RunState::Connected, RunState::Exporting, RunState::Compressing, RunState::Uploading, RunState::Completed])]
#[tokio::test]
async fn test_run_visits_optional_stages(
    #[case] compress: bool,
    #[case] cloud: bool,
    #[case] expected: Vec<RunState>,
) {
    let ctx = TestContext::new();
    let manager = ctx.manager(MockDatabaseOps::new());

    let mut builder = RequestBuilder::mysql("shop");
    if compress {
        builder = builder.compress();
    }
    if cloud {
        builder = builder.cloud();
    }

    let (outcome, states) = manager.run_traced(&builder.build()).await;

    assert!(outcome.is_success());
    assert_eq!(states, expected);
}

#[tokio::test]
async fn test_run_failure_ends_in_failed_state() {
    let ctx = TestContext::new();
    let manager = ctx.manager(MockDatabaseOps::new().with_failing_connect());

    let (outcome, states) = manager
        .run_traced(&RequestBuilder::mongodb("shop").compress().build())
        .await;

    assert!(!outcome.is_success());
    assert_eq!(
        states,
        vec![RunState::Idle, RunState::Connecting, RunState::Failed]
    );
}

#[tokio::test]
async fn test_run_reports_artifact_paths() {
    let ctx = TestContext::new();
    let manager = ctx.manager(MockDatabaseOps::new());

    let artifacts = manager
        .run(&RequestBuilder::postgres("inventory").compress().build())
        .await
        .into_result()
        .assert_ok();

    let paths: Vec<_> = artifacts.iter().map(|a| a.path.clone()).collect();
    assert_eq!(
        paths,
        vec![
            ctx.output_dir().join("inventory-backup.sql"),
            ctx.output_dir().join("inventory-backup.zip"),
        ]
    );
    assert!(artifacts.iter().all(|a| a.kind == DatabaseKind::Postgres));
}

#[tokio::test]
async fn test_independent_runs_do_not_interfere() {
    let ctx = TestContext::new();
    let mysql = ctx.manager(MockDatabaseOps::new());
    let mongo = ctx.manager(MockDatabaseOps::new().with_collections(shop_collections()));

    let shop = RequestBuilder::mysql("shop").build();
    let catalog = RequestBuilder::mongodb("catalog").build();
    let (first, second) = tokio::join!(mysql.run(&shop), mongo.run(&catalog));

    assert!(first.is_success());
    assert!(second.is_success());
    assert_eq!(
        ctx.artifact_names(),
        vec!["catalog-backup.json".to_string(), "shop-backup.sql".to_string()]
    );
}
