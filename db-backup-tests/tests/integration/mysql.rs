//! MySQL integration tests
//!
//! These tests require Docker and a local `mysqldump` client.
//! Run with: `cargo test -p db-backup-tests --test integration -- --ignored`

use super::common::{has_program, is_docker_available, ContainerGuard};
use db_backup::RealDatabaseOps;
use serial_test::serial;
use test_utils::test_context::read_zip_entries;
use test_utils::*;

#[tokio::test]
#[ignore] // Requires Docker
#[serial]
async fn test_mysql_full_dump_with_compression() {
    if !is_docker_available() || !has_program("mysqldump") {
        println!("Docker or mysqldump not available, skipping test");
        return;
    }

    let container = ContainerGuard::start(
        "db-backup-test-mysql",
        "mysql:8.0",
        &["MYSQL_ROOT_PASSWORD=testpass", "MYSQL_DATABASE=shop"],
    )
    .expect("Failed to start MySQL");
    container
        .wait_until_ready(&["mysql", "-uroot", "-ptestpass", "-h127.0.0.1", "-e", "SELECT 1"])
        .expect("MySQL failed to become ready");
    container
        .exec(&[
            "mysql",
            "-uroot",
            "-ptestpass",
            "shop",
            "-e",
            "CREATE TABLE orders (id INT PRIMARY KEY, item VARCHAR(32)); \
             INSERT INTO orders VALUES (1, 'book'), (2, 'pen');",
        ])
        .expect("Failed to create test data");

    let ctx = TestContext::new();
    let request = RequestBuilder::mysql("shop")
        .host("127.0.0.1")
        .port(container.host_port(3306).unwrap())
        .credentials("root", "testpass")
        .compress()
        .build();

    let artifacts = ctx
        .manager(RealDatabaseOps::new())
        .run(&request)
        .await
        .into_result()
        .assert_ok();

    let dump = String::from_utf8(ctx.read_artifact("shop-backup.sql").unwrap()).unwrap();
    assert!(dump.contains("CREATE TABLE `orders`"));
    assert!(dump.contains("'book'"));

    let entries = read_zip_entries(&artifacts[1].path).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].1, dump.as_bytes());
    assert_eq!(
        ctx.notifier().events(),
        vec![BackupEvent::Started, BackupEvent::Completed]
    );
    assert_eq!(container.name(), "db-backup-test-mysql");
}
