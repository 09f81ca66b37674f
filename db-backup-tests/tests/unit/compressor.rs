//! Tests for the compression stage

use db_backup::utils::compress::compress_file;
use test_utils::test_context::read_zip_entries;
use test_utils::*;

#[tokio::test]
async fn test_compressed_archive_matches_raw_artifact() {
    let ctx = TestContext::new();
    let ops = MockDatabaseOps::new().with_sql_dump(sample_sql_dump());
    let manager = ctx.manager(ops);

    let artifacts = manager
        .run(&RequestBuilder::mysql("shop").compress().build())
        .await
        .into_result()
        .assert_ok();

    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[1].stage, ArtifactStage::Compressed);
    assert_eq!(
        ctx.artifact_names(),
        vec!["shop-backup.sql".to_string(), "shop-backup.zip".to_string()]
    );

    let entries = read_zip_entries(&artifacts[1].path).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "shop-backup.sql");
    assert_eq!(entries[0].1, ctx.read_artifact("shop-backup.sql").unwrap());
}

#[tokio::test]
async fn test_compressed_json_export() {
    let ctx = TestContext::new();
    let ops = MockDatabaseOps::new().with_collections(shop_collections());
    let manager = ctx.manager(ops);

    let artifacts = manager
        .run(&RequestBuilder::mongodb("shop").compress().build())
        .await
        .into_result()
        .assert_ok();

    let entries = read_zip_entries(&artifacts[1].path).unwrap();
    assert_eq!(entries[0].0, "shop-backup.json");
    assert_eq!(entries[0].1, ctx.read_artifact("shop-backup.json").unwrap());
}

#[test]
fn test_compress_missing_source_fails() {
    let ctx = TestContext::new();
    let target = ctx.temp_dir().join("missing-backup.zip");

    let result = compress_file(&ctx.temp_dir().join("missing-backup.sql"), &target);

    assert!(result.is_err());
    assert!(!target.exists());
}
