//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error whose details name the
//! offending field, so clients can highlight it:
//! `{"field": "species", "code": "invalid_value", "value": "dragon"}`.

use std::fmt::Display;
use std::str::FromStr;

use pagination::{PageLimits, PageRequest, PaginationError};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{Error, IdValidationError, UnknownVariant};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingField,
    InvalidUuid,
    InvalidValue,
    InvalidId,
    InvalidField,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidValue => "invalid_value",
            Self::InvalidId => "invalid_id",
            Self::InvalidField => "invalid_field",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub(crate) const fn as_str(self) -> &'static str {
        self.0
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    Error::invalid_request(format!("missing required field: {field}")).with_details(json!({
        "field": field,
        "code": ValidationCode::MissingField.as_str(),
    }))
}

/// Error for a field whose domain validation failed.
pub(crate) fn field_error(field: &str, message: impl Display) -> Error {
    Error::invalid_request(message.to_string()).with_details(json!({
        "field": field,
        "code": ValidationCode::InvalidField.as_str(),
    }))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value.trim()).map_err(|_| {
        let field = field.as_str();
        Error::invalid_request(format!("{field} must be a valid UUID")).with_details(json!({
            "field": field,
            "value": value,
            "code": ValidationCode::InvalidUuid.as_str(),
        }))
    })
}

/// Parse a closed-vocabulary value such as a species or language.
pub(crate) fn parse_vocabulary<T>(value: &str, field: FieldName) -> Result<T, Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    value.parse().map_err(|err: UnknownVariant| {
        let field = field.as_str();
        Error::invalid_request(format!("{field} must be one of: {}", err.expected)).with_details(
            json!({
                "field": field,
                "value": err.value,
                "code": ValidationCode::InvalidValue.as_str(),
            }),
        )
    })
}

pub(crate) fn parse_optional_vocabulary<T>(
    value: Option<&str>,
    field: FieldName,
) -> Result<Option<T>, Error>
where
    T: FromStr<Err = UnknownVariant>,
{
    value
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| parse_vocabulary(raw, field))
        .transpose()
}

/// Parse a record identifier taken from the path or body.
pub(crate) fn parse_record_id<T>(value: String, field: FieldName) -> Result<T, Error>
where
    T: TryFrom<String, Error = IdValidationError>,
{
    T::try_from(value.clone()).map_err(|err| {
        let field = field.as_str();
        Error::invalid_request(format!("{field}: {err}")).with_details(json!({
            "field": field,
            "value": value,
            "code": ValidationCode::InvalidId.as_str(),
        }))
    })
}

/// Parse raw `limit`/`offset` query values.
pub(crate) fn parse_page(
    limit: Option<&str>,
    offset: Option<&str>,
    limits: PageLimits,
) -> Result<PageRequest, Error> {
    PageRequest::parse(limit, offset, limits).map_err(|err: PaginationError| {
        Error::invalid_request(err.to_string()).with_details(json!({
            "field": err.field(),
            "code": ValidationCode::InvalidValue.as_str(),
        }))
    })
}
