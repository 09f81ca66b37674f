//! Tests for notification delivery during a run
//!
//! The run reports through a notification manager; sink failures must never
//! change the outcome.

use db_backup::managers::notification::{NotificationManager, NotificationSink};
use std::sync::Arc;
use std::time::Duration;
use test_utils::*;

fn manager_with_sinks(
    ctx: &TestContext,
    ops: MockDatabaseOps,
    sinks: Vec<Arc<dyn NotificationSink>>,
) -> (BackupManager<MockDatabaseOps>, Arc<NotificationManager>) {
    let notifications = Arc::new(NotificationManager::with_sinks(sinks));
    let manager = BackupManager::new(
        ops,
        notifications.clone(),
        Box::new(db_backup::managers::upload::LogOnlyUploader),
        ctx.output_dir(),
    );
    (manager, notifications)
}

#[tokio::test]
async fn test_sinks_receive_started_and_completed() {
    let ctx = TestContext::new();
    let sink = RecordingSink::default();
    let (manager, notifications) =
        manager_with_sinks(&ctx, MockDatabaseOps::new(), vec![Arc::new(sink.clone())]);

    let outcome = manager.run(&RequestBuilder::mysql("shop").build()).await;
    notifications.flush(Duration::from_secs(5)).await;

    assert!(outcome.is_success());
    let mut titles = sink.titles();
    titles.sort();
    assert_eq!(titles, vec!["Backup Completed", "Backup Started"]);
}

#[tokio::test]
async fn test_failing_sink_does_not_fail_run() {
    let ctx = TestContext::new();
    let failing = RecordingSink::failing();
    let (manager, notifications) =
        manager_with_sinks(&ctx, MockDatabaseOps::new(), vec![Arc::new(failing.clone())]);

    let outcome = manager
        .run(&RequestBuilder::mongodb("shop").compress().build())
        .await;
    notifications.flush(Duration::from_secs(5)).await;

    assert!(outcome.is_success());
    assert_eq!(failing.titles().len(), 2);
}

#[tokio::test]
async fn test_connect_failure_delivers_only_failed() {
    let ctx = TestContext::new();
    let sink = RecordingSink::default();
    let (manager, notifications) = manager_with_sinks(
        &ctx,
        MockDatabaseOps::new().with_failing_connect(),
        vec![Arc::new(sink.clone())],
    );

    manager.run(&RequestBuilder::postgres("shop").build()).await;
    notifications.flush(Duration::from_secs(5)).await;

    assert_eq!(sink.titles(), vec!["Backup Failed"]);
}
