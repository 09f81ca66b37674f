//! MongoDB integration tests
//!
//! These tests require Docker and verify the document export against a real server.
//! Run with: `cargo test -p db-backup-tests --test integration -- --ignored`

use super::common::{is_docker_available, ContainerGuard};
use db_backup::strategies::mongodb_export::CollectionDump;
use db_backup::RealDatabaseOps;
use serial_test::serial;
use test_utils::*;

#[tokio::test]
#[ignore] // Requires Docker
#[serial]
async fn test_mongodb_shop_export() {
    if !is_docker_available() {
        println!("Docker not available, skipping test");
        return;
    }

    let container = ContainerGuard::start(
        "db-backup-test-mongodb",
        "mongo:7",
        &["MONGO_INITDB_ROOT_USERNAME=root", "MONGO_INITDB_ROOT_PASSWORD=test pass"],
    )
    .expect("Failed to start MongoDB");

    let mongosh = |script: &str| {
        container.exec(&[
            "mongosh",
            "--quiet",
            "-u",
            "root",
            "-p",
            "test pass",
            "--authenticationDatabase",
            "admin",
            "shop",
            "--eval",
            script,
        ])
    };

    for _ in 0..60 {
        if mongosh("db.runCommand({ ping: 1 })").is_ok() {
            break;
        }
        std::thread::sleep(std::time::Duration::from_secs(1));
    }
    mongosh(
        "db.orders.insertMany([{ item: 'book', qty: 1 }, { item: 'pen', qty: 3 }]); \
         db.users.insertOne({ name: 'ada' });",
    )
    .expect("Failed to create test data");

    let ctx = TestContext::new();
    // the space in the password exercises URI escaping
    let request = RequestBuilder::mongodb("shop")
        .host("127.0.0.1")
        .port(container.host_port(27017).unwrap())
        .credentials("root", "test pass")
        .build();

    ctx.manager(RealDatabaseOps::new())
        .run(&request)
        .await
        .into_result()
        .assert_ok();

    let parsed: Vec<CollectionDump> =
        serde_json::from_slice(&ctx.read_artifact("shop-backup.json").unwrap()).unwrap();
    assert_eq!(parsed.len(), 2);
    assert_eq!(parsed[0].collection, "orders");
    assert_eq!(parsed[0].docs.len(), 2);
    assert_eq!(parsed[0].docs[0]["item"], "book");
    assert_eq!(parsed[1].collection, "users");
    assert_eq!(parsed[1].docs.len(), 1);
}
