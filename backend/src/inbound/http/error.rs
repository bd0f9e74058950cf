//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into one JSON envelope:
//! `{success: false, error, code, message, timestamp, traceId?, details?}`.
//! Extractor failures (malformed JSON, bad query strings or path segments)
//! are routed through the same envelope so clients see a single shape.

use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

/// Wire form of an error response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope<'a> {
    success: bool,
    error: &'static str,
    code: ErrorCode,
    message: &'a str,
    timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a Value>,
}

impl<'a> ErrorEnvelope<'a> {
    /// Envelope for `error`, stamped with `timestamp`.
    #[must_use]
    pub fn new(error: &'a Error, timestamp: DateTime<Utc>) -> Self {
        Self {
            success: false,
            error: error.code().label(),
            code: error.code(),
            message: error.message(),
            timestamp,
            trace_id: error.trace_id(),
            details: error.details(),
        }
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = ?self.code(), message = %self.message(), "request failed");
        }
        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        let body = redact_if_internal(self);
        builder.json(ErrorEnvelope::new(&body, Utc::now()))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Error::internal("Internal server error")
    }
}

fn extractor_error(kind: &'static str, detail: String, req: &HttpRequest) -> actix_web::Error {
    warn!(kind, path = req.path(), detail = %detail, "request rejected by extractor");
    Error::invalid_request(format!("Invalid {kind}"))
        .with_details(json!({ "reason": detail }))
        .into()
}

/// `JsonConfig` error handler producing the shared envelope.
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    let status = err.status_code();
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        return Error::invalid_request("Request body too large").into();
    }
    extractor_error("request body", err.to_string(), req)
}

/// `QueryConfig` error handler producing the shared envelope.
pub fn query_error_handler(err: QueryPayloadError, req: &HttpRequest) -> actix_web::Error {
    extractor_error("query parameters", err.to_string(), req)
}

/// `PathConfig` error handler producing the shared envelope.
pub fn path_error_handler(err: PathError, req: &HttpRequest) -> actix_web::Error {
    extractor_error("path parameters", err.to_string(), req)
}

#[cfg(test)]
mod tests;
