//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper yields an `invalid_request` error whose details name the
//! offending field, so clients can highlight it.

use actix_web::error::{JsonPayloadError, QueryPayloadError};
use actix_web::{HttpRequest, web};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use pagination::{PageParams, PageParamsError};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use tracing::debug;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidId,
    InvalidTimestamp,
    InvalidValue,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidId => "invalid_id",
            ErrorCode::InvalidTimestamp => "invalid_timestamp",
            ErrorCode::InvalidValue => "invalid_value",
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

    pub(crate) const fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: &'static str,
    message: String,
}

impl ValidationError {
    fn new(field: FieldName, message: impl Into<String>) -> Self {
        Self {
            field: field.as_str(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: &str) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value,
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("missing required field: {name}"))
        .with_code(ErrorCode::MissingField)
}

/// A required string field; blank counts as missing.
pub(crate) fn required(field: FieldName, value: Option<String>) -> Result<String, Error> {
    value
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| missing_field_error(field))
}

/// Map a domain validation failure onto `field`.
pub(crate) fn invalid_value(field: FieldName, error: impl std::fmt::Display) -> Error {
    ValidationError::new(field, error.to_string()).with_code(ErrorCode::InvalidValue)
}

/// Parse an identifier such as a `UserId` or `SwapId`.
pub(crate) fn parse_id<T>(field: FieldName, raw: &str) -> Result<T, Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|error| {
        ValidationError::new(field, error.to_string()).with_value(ErrorCode::InvalidId, raw)
    })
}

/// Parse an enum-like query or body value through its `FromStr` impl.
pub(crate) fn parse_value<T>(field: FieldName, raw: &str) -> Result<T, Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|error| {
        ValidationError::new(field, error.to_string()).with_value(ErrorCode::InvalidValue, raw)
    })
}

/// Parse an optional value, treating blank strings as absent.
pub(crate) fn parse_optional<T>(field: FieldName, raw: Option<&str>) -> Result<Option<T>, Error>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_value(field, value).map(Some),
        None => Ok(None),
    }
}

pub(crate) fn invalid_timestamp_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    ValidationError::new(field, format!("{name} must be an RFC 3339 timestamp"))
        .with_value(ErrorCode::InvalidTimestamp, value)
}

pub(crate) fn parse_timestamp(field: FieldName, raw: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(raw)
        .map(|value| value.with_timezone(&Utc))
        .map_err(|_| invalid_timestamp_error(field, raw))
}

/// Which end of a day a bare calendar date stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DayBound {
    Start,
    End,
}

/// Parse a report bound given either as a timestamp or a calendar date.
///
/// A bare date covers the whole day: `Start` maps to midnight and `End` to
/// the last representable instant of that day.
pub(crate) fn parse_date_bound(
    field: FieldName,
    raw: &str,
    bound: DayBound,
) -> Result<DateTime<Utc>, Error> {
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Ok(value.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| invalid_timestamp_error(field, raw))?;
    let time = match bound {
        DayBound::Start => NaiveTime::MIN,
        DayBound::End => NaiveTime::from_hms_milli_opt(23, 59, 59, 999)
            .ok_or_else(|| invalid_timestamp_error(field, raw))?,
    };
    Ok(date.and_time(time).and_utc())
}

/// Validate `page` and `limit` query values.
pub(crate) fn page_params(page: Option<u32>, limit: Option<u32>) -> Result<PageParams, Error> {
    PageParams::new(page, limit).map_err(|error| {
        let field = match error {
            PageParamsError::PageOutOfRange => FieldName::new("page"),
            PageParamsError::LimitOutOfRange { .. } => FieldName::new("limit"),
        };
        invalid_value(field, error)
    })
}

/// Deserialise a field that distinguishes "absent" from "null".
///
/// Use with `#[serde(default, deserialize_with = "present")]`: an absent
/// field stays `None`, an explicit `null` becomes `Some(None)`.
pub(crate) fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(%error, "rejected JSON body");
    Error::invalid_request(format!("invalid JSON body: {error}")).into()
}

fn query_error_handler(error: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    debug!(%error, "rejected query string");
    Error::invalid_request(format!("invalid query string: {error}")).into()
}

fn path_error_handler(
    error: actix_web::error::PathError,
    _req: &HttpRequest,
) -> actix_web::Error {
    Error::invalid_request(format!("invalid path: {error}")).into()
}

/// Extractor configuration mapping malformed input to `invalid_request`.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .app_data(web::PathConfig::default().error_handler(path_error_handler));
}
