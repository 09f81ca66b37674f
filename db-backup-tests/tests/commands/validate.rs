//! Tests for request validation
//!
//! Requests are checked for shape before the pipeline runs; the database kind
//! is left to the pipeline so it fails with its own error.

use db_backup::config::validate_request;
use rstest::rstest;
use test_utils::*;

#[test]
fn test_valid_request() {
    validate_request(&RequestBuilder::mysql("shop").build()).assert_ok();
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("../shop")]
#[case("shop/orders")]
#[case("shop\\orders")]
fn test_invalid_dbname(#[case] dbname: &str) {
    let request = RequestBuilder::mysql(dbname).build();
    assert!(validate_request(&request).is_err());
}

#[test]
fn test_empty_host_rejected() {
    let request = RequestBuilder::postgres("shop").host("").build();
    validate_request(&request).assert_err_contains("Host");
}

#[test]
fn test_zero_port_rejected() {
    let request = RequestBuilder::postgres("shop").port(0).build();
    validate_request(&request).assert_err_contains("Port");
}

#[test]
fn test_unknown_kind_passes_validation() {
    let request = RequestBuilder::new("cassandra", "shop").build();
    validate_request(&request).assert_ok();
    assert!(request.kind().is_err());
}

#[test]
fn test_request_debug_redacts_password() {
    let request = RequestBuilder::mysql("shop")
        .credentials("admin", "hunter2")
        .build();
    let debug = format!("{:?}", request);
    assert!(debug.contains("admin"));
    assert!(!debug.contains("hunter2"));
}
