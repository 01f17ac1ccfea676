//! Repository layer: trait definitions and their SQL implementations.

pub mod reservation;
pub mod reservation_sql;
pub mod room;
pub mod room_sql;
pub mod user;
pub mod user_sql;

use crate::error::DbError;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub(crate) fn parse_uuid(column: &str, value: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(value)
        .map_err(|e| DbError::CorruptRow(format!("{column} '{value}' is not a uuid: {e}")))
}

// Timestamps are persisted as unix epoch seconds: the sqlx "any" driver has
// no chrono decode support, and epoch integers compare correctly in SQL.
pub(crate) fn to_epoch(ts: DateTime<Utc>) -> i64 {
    ts.timestamp()
}

pub(crate) fn from_epoch(column: &str, secs: i64) -> Result<DateTime<Utc>, DbError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| DbError::CorruptRow(format!("{column} {secs} is out of range")))
}
