//! Tests for HTTP error mapping.

use super::*;
use actix_web::body::to_bytes;
use actix_web::test::TestRequest;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn expected_trace_id() -> String {
    TRACE_ID.to_owned()
}

#[rstest]
#[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
#[case(Error::unauthorized("no auth"), StatusCode::UNAUTHORIZED)]
#[case(Error::forbidden("denied"), StatusCode::FORBIDDEN)]
#[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
#[case(Error::conflict("taken"), StatusCode::CONFLICT)]
#[case(Error::too_many_requests("slow down"), StatusCode::TOO_MANY_REQUESTS)]
#[case(Error::service_unavailable("later"), StatusCode::SERVICE_UNAVAILABLE)]
#[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
fn status_code_matches_error_code(#[case] err: Error, #[case] status: StatusCode) {
    assert_eq!(ResponseError::status_code(&err), status);
}

async fn body_of(response: HttpResponse) -> Value {
    let bytes = to_bytes(response.into_body())
        .await
        .expect("reading response body succeeds");
    serde_json::from_slice(&bytes).expect("error JSON deserialisation succeeds")
}

#[rstest]
#[actix_web::test]
async fn internal_errors_are_redacted_but_keep_trace_id(expected_trace_id: String) {
    let error = Error::internal("boom")
        .with_trace_id(expected_trace_id.clone())
        .with_details(json!({"secret": "x"}));

    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let header = response
        .headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    assert_eq!(header.as_deref(), Some(TRACE_ID));

    let body = body_of(response).await;
    assert_eq!(body["success"], json!(false));
    assert_eq!(body["error"], json!("Internal Server Error"));
    assert_eq!(body["code"], json!("internal_error"));
    assert_eq!(body["message"], json!("Internal server error"));
    assert_eq!(body["traceId"], json!(expected_trace_id));
    assert!(body.get("details").is_none());
    assert!(body["timestamp"].is_string());
}

#[rstest]
#[actix_web::test]
async fn validation_errors_carry_label_and_details() {
    let error = Error::invalid_request("bad").with_details(json!({"field": "species"}));

    let response = ResponseError::error_response(&error);
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(response.headers().get(TRACE_ID_HEADER).is_none());

    let body = body_of(response).await;
    assert_eq!(body["error"], json!("Validation Error"));
    assert_eq!(body["message"], json!("bad"));
    assert_eq!(body["details"], json!({"field": "species"}));
    assert!(body.get("traceId").is_none());
}

#[rstest]
#[actix_web::test]
async fn rate_limited_errors_use_their_own_label() {
    let error = Error::too_many_requests("Rate limit exceeded. Please try again later.");
    let body = body_of(ResponseError::error_response(&error)).await;
    assert_eq!(body["error"], json!("Too Many Requests"));
    assert_eq!(body["code"], json!("too_many_requests"));
}

#[rstest]
fn redaction_only_touches_internal_errors() {
    let internal = Error::internal("db exploded").with_trace_id(TRACE_ID);
    assert_eq!(redact_if_internal(&internal).message(), "Internal server error");
    assert_eq!(redact_if_internal(&internal).trace_id(), Some(TRACE_ID));

    let missing = Error::not_found("Trail not found");
    assert_eq!(redact_if_internal(&missing), missing);
}

#[rstest]
#[actix_web::test]
async fn query_errors_become_validation_envelopes() {
    let req = TestRequest::default().uri("/api/trails?x").to_http_request();
    let err = query_error_handler(
        QueryPayloadError::Deserialize(
            serde::de::Error::custom("unknown variant `steep`"),
        ),
        &req,
    );
    let response = err.error_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_of(response).await;
    assert_eq!(body["message"], json!("Invalid query parameters"));
    assert!(
        body["details"]["reason"]
            .as_str()
            .is_some_and(|reason| reason.contains("steep"))
    );
}

#[rstest]
fn from_actix_error_is_redacted_internal_error() {
    let err: Error = actix_web::error::ErrorBadRequest("boom").into();

    assert_eq!(err.code(), ErrorCode::InternalError);
    assert_eq!(err.message(), "Internal server error");
    assert_eq!(err.details(), None);
}
