use crate::DbError;

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Timestamps are stored as Unix milliseconds.
pub(crate) fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

#[track_caller]
pub(crate) fn from_millis(table: &'static str, millis: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| DbError::decode(table, format!("invalid timestamp {millis}")))
}

#[track_caller]
pub(crate) fn parse_uuid(table: &'static str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value).map_err(|e| DbError::decode(table, format!("invalid UUID {value}: {e}")))
}
