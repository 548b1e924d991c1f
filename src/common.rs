/// Common types and utilities shared across repositories and services
use chrono::{NaiveDateTime, Timelike, Utc};

use crate::errors::ServiceError;

/// Text layout of every persisted timestamp column (`yyyy-MM-dd HH:mm:ss`).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current time truncated to whole seconds, the precision the store keeps.
pub fn now() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(0).unwrap_or(now)
}

/// Renders a timestamp in the storage layout
pub fn format_timestamp(value: &NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Parses a timestamp column value
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ServiceError> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT).map_err(|e| {
        ServiceError::InternalError(format!("Malformed timestamp '{}': {}", value, e))
    })
}

/// Parses a nullable timestamp column value
pub fn parse_optional_timestamp(value: Option<&str>) -> Result<Option<NaiveDateTime>, ServiceError> {
    value.map(parse_timestamp).transpose()
}
