//! Unit tests for settings-driven wiring
//!
//! These tests verify that a settings file selects the upload store and
//! logging options the pipeline runs with.

use db_backup::config::load_config;
use db_backup::managers::logging::LoggingConfig;
use db_backup::managers::upload::uploader_for;
use test_utils::*;

fn write_settings(ctx: &TestContext) -> std::path::PathBuf {
    let root = ctx.temp_dir().display().to_string();
    ctx.create_file(
        "config.toml",
        &render_template(settings_toml(), &[("root", root.as_str())]),
    )
}

#[test]
fn test_settings_select_local_store() {
    let ctx = TestContext::new();
    let config = load_config(write_settings(&ctx)).assert_ok();

    let uploader = uploader_for(&config.upload).unwrap();
    assert_eq!(uploader.store(), StoreKind::Local);
}

#[test]
fn test_settings_logging_options() {
    let ctx = TestContext::new();
    let config = load_config(write_settings(&ctx)).assert_ok();

    let logging = LoggingConfig::from_settings(&config.logging);
    assert_eq!(logging.log_directory, ctx.temp_dir().join("logs"));
    assert_eq!(logging.log_level.to_string(), "DEBUG");
    assert_eq!(logging.max_files, 3);
}

#[tokio::test]
async fn test_settings_store_receives_upload() {
    let ctx = TestContext::new();
    let config = load_config(write_settings(&ctx)).assert_ok();
    let uploader = uploader_for(&config.upload).unwrap();

    let manager = ctx.manager_with_uploader(MockDatabaseOps::new(), uploader);
    manager
        .run(&RequestBuilder::postgres("inventory").cloud().build())
        .await
        .into_result()
        .assert_ok();

    assert!(ctx.mirror_dir().join("inventory-backup.sql").exists());
}

#[test]
fn test_local_store_without_directory_rejected() {
    let ctx = TestContext::new();
    let path = ctx.create_file("config.toml", "[upload]\nstore = \"local\"\n");

    load_config(path).assert_err_contains("upload.directory");
}
