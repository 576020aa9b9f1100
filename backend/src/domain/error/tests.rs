//! Tests for domain error construction and serialization.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn base_error() -> Error {
    Error::invalid_request("bad")
}

#[rstest]
#[case(Error::invalid_request("x"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("x"), ErrorCode::Unauthorized)]
#[case(Error::forbidden("x"), ErrorCode::Forbidden)]
#[case(Error::not_found("x"), ErrorCode::NotFound)]
#[case(Error::conflict("x"), ErrorCode::Conflict)]
#[case(Error::invalid_state("x"), ErrorCode::InvalidState)]
#[case(Error::service_unavailable("x"), ErrorCode::ServiceUnavailable)]
#[case(Error::internal("x"), ErrorCode::InternalError)]
fn constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
fn try_new_rejects_empty_messages() {
    let result = Error::try_new(ErrorCode::InvalidRequest, "   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyMessage)));
}

#[rstest]
fn new_falls_back_to_generic_message() {
    let error = Error::new(ErrorCode::NotFound, "");
    assert_eq!(error.message(), "not found");
}

#[rstest]
fn try_with_trace_id_rejects_empty_values(base_error: Error) {
    let result = base_error.try_with_trace_id("   ");
    assert!(matches!(result, Err(ErrorValidationError::EmptyTraceId)));
}

#[rstest]
fn trace_id_is_absent_out_of_scope() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[tokio::test]
async fn trace_id_is_captured_in_scope() {
    let trace_id: TraceId = TRACE_ID.parse().expect("valid uuid");
    let error = TraceId::scope(trace_id, async { Error::not_found("missing") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn redacted_hides_internal_details() {
    let error = Error::internal("db exploded")
        .with_details(json!({"secret": "x"}))
        .redacted();
    assert_eq!(error.message(), "Internal server error");
    assert!(error.details().is_none());
}

#[rstest]
fn redacted_hides_store_outage_details() {
    let error = Error::service_unavailable("pool timed out after 30s at db:5432")
        .with_details(json!({"host": "db"}))
        .redacted();
    assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    assert_eq!(error.message(), "Service temporarily unavailable");
    assert!(error.details().is_none());
}

#[rstest]
fn redacted_keeps_client_errors(base_error: Error) {
    let error = base_error.with_details(json!({"field": "name"})).redacted();
    assert_eq!(error.message(), "bad");
    assert!(error.details().is_some());
}

#[rstest]
fn serializes_camel_case_payload(base_error: Error) {
    let error = base_error
        .with_trace_id(TRACE_ID)
        .with_details(json!({"field": "name"}));
    let value = serde_json::to_value(&error).expect("serialize");
    assert_eq!(
        value,
        json!({
            "code": "invalid_request",
            "message": "bad",
            "traceId": TRACE_ID,
            "details": {"field": "name"}
        })
    );
}

#[rstest]
fn deserialization_rejects_blank_messages() {
    let result = serde_json::from_value::<Error>(json!({"code": "not_found", "message": " "}));
    assert!(result.is_err());
}

#[rstest]
fn invalid_state_serializes_snake_case() {
    let value = serde_json::to_value(ErrorCode::InvalidState).expect("serialize");
    assert_eq!(value, json!("invalid_state"));
}
