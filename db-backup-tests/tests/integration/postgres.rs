//! PostgreSQL integration tests
//!
//! These tests require Docker and verify the catalog export against a real server.
//! Run with: `cargo test -p db-backup-tests --test integration -- --ignored`

use super::common::{is_docker_available, ContainerGuard};
use db_backup::strategies::postgres_catalog::CatalogRow;
use db_backup::RealDatabaseOps;
use serial_test::serial;
use std::time::Duration;
use test_utils::*;

fn start_postgres(name: &str) -> ContainerGuard {
    let container = ContainerGuard::start(
        name,
        "postgres:15-alpine",
        &["POSTGRES_PASSWORD=testpass", "POSTGRES_DB=testdb"],
    )
    .expect("Failed to start PostgreSQL");

    container
        .wait_until_ready(&["pg_isready", "-U", "postgres", "-h", "127.0.0.1"])
        .expect("PostgreSQL failed to become ready");
    // pg_isready passes before the init scripts finish restarting the server
    std::thread::sleep(Duration::from_secs(3));
    container
}

fn exec_sql(container: &ContainerGuard, sql: &str) {
    container
        .exec(&["psql", "-U", "postgres", "-d", "testdb", "-c", sql])
        .expect("Failed to execute SQL");
}

#[tokio::test]
#[ignore] // Requires Docker
#[serial]
async fn test_postgres_catalog_backup() {
    if !is_docker_available() {
        println!("Docker not available, skipping test");
        return;
    }

    let container = start_postgres("db-backup-test-postgres");
    exec_sql(&container, "CREATE TABLE orders (id SERIAL PRIMARY KEY, total NUMERIC)");
    exec_sql(&container, "CREATE TABLE customers (id SERIAL PRIMARY KEY, name TEXT)");

    let ctx = TestContext::new();
    let request = RequestBuilder::postgres("testdb")
        .host("127.0.0.1")
        .port(container.host_port(5432).unwrap())
        .credentials("postgres", "testpass")
        .compress()
        .build();

    let artifacts = ctx
        .manager(RealDatabaseOps::new())
        .run(&request)
        .await
        .into_result()
        .assert_ok();

    assert_eq!(artifacts.len(), 2);
    let contents = String::from_utf8(ctx.read_artifact("testdb-backup.sql").unwrap()).unwrap();
    let tables: Vec<String> = contents
        .lines()
        .map(|line| serde_json::from_str::<CatalogRow>(line).unwrap().table_name)
        .collect();
    assert_eq!(tables, vec!["customers", "orders"]);
    assert_eq!(
        ctx.notifier().events(),
        vec![BackupEvent::Started, BackupEvent::Completed]
    );
}

#[tokio::test]
#[ignore] // Requires Docker
#[serial]
async fn test_postgres_wrong_password() {
    if !is_docker_available() {
        println!("Docker not available, skipping test");
        return;
    }

    let container = start_postgres("db-backup-test-postgres-auth");

    let ctx = TestContext::new();
    let request = RequestBuilder::postgres("testdb")
        .host("127.0.0.1")
        .port(container.host_port(5432).unwrap())
        .credentials("postgres", "wrong")
        .build();

    let outcome = ctx.manager(RealDatabaseOps::new()).run(&request).await;

    assert!(matches!(
        outcome.into_result(),
        Err(BackupError::Connection { .. })
    ));
    assert!(ctx.artifact_names().is_empty());
    assert_eq!(ctx.notifier().events(), vec![BackupEvent::Failed]);
}
