//! Query-parameter intake and validation for `GET /api/worklogs`.
//!
//! Work-window bounds are compared as given: work intervals are stored in
//! local time. Creation-window bounds are local input too, but `created_at`
//! is stored in UTC, so they are shifted back by the local offset before
//! they reach the store.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveDateTime};
use serde::Deserialize;

use crate::errors::AppError;

/// Four-digit years only; chrono's extended range is wider than the column's.
const SUPPORTED_YEARS: std::ops::RangeInclusive<i32> = 1..=9999;

/// Offset of the local wall clock all inputs and outputs use (UTC+8).
pub const LOCAL_UTC_OFFSET_HOURS: i64 = 8;

pub fn local_offset() -> Duration {
    Duration::hours(LOCAL_UTC_OFFSET_HOURS)
}

/// Raw query string as sent by the client.
#[derive(Debug, Default, Deserialize)]
pub struct WorklogQuery {
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub created_start_time: Option<String>,
    pub created_end_time: Option<String>,
    pub username: Option<String>,
}

/// Inclusive bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeWindow {
    fn local_to_utc(self, start_name: &'static str, end_name: &'static str) -> Result<Self, AppError> {
        Ok(Self {
            start: shift_to_utc(start_name, self.start)?,
            end: shift_to_utc(end_name, self.end)?,
        })
    }
}

fn shift_to_utc(name: &'static str, local: NaiveDateTime) -> Result<NaiveDateTime, AppError> {
    local
        .checked_sub_signed(local_offset())
        .ok_or_else(|| AppError::InvalidParameter {
            name,
            reason: format!("{} cannot be converted to UTC", local),
        })
}

/// A validated filter, ready to run against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorklogFilter {
    /// Local time: records with `start_time >= start` and `end_time <= end`.
    pub work_window: Option<TimeWindow>,
    /// Already converted to UTC, compared against `created_at`.
    pub created_window: Option<TimeWindow>,
    /// Case-insensitive substring of the owner's username.
    pub username: Option<String>,
}

impl WorklogFilter {
    /// `created_at` is part of the output only when the caller filtered on it.
    pub fn includes_created_at(&self) -> bool {
        self.created_window.is_some()
    }
}

impl WorklogQuery {
    pub fn into_filter(self) -> Result<WorklogFilter, AppError> {
        let work_start = parse_param("start_time", self.start_time.as_deref())?;
        let work_end = parse_param("end_time", self.end_time.as_deref())?;
        let created_start = parse_param("created_start_time", self.created_start_time.as_deref())?;
        let created_end = parse_param("created_end_time", self.created_end_time.as_deref())?;

        let work_window = pair("start_time", "end_time", work_start, work_end)?;
        let created_window = pair(
            "created_start_time",
            "created_end_time",
            created_start,
            created_end,
        )?;

        if work_window.is_none() && created_window.is_none() {
            return Err(AppError::MissingTimeRange);
        }

        let created_window = created_window
            .map(|w| w.local_to_utc("created_start_time", "created_end_time"))
            .transpose()?;

        Ok(WorklogFilter {
            work_window,
            created_window,
            username: self.username.filter(|u| !u.is_empty()),
        })
    }
}

fn pair(
    start_name: &str,
    end_name: &str,
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Result<Option<TimeWindow>, AppError> {
    match (start, end) {
        (Some(start), Some(end)) => Ok(Some(TimeWindow { start, end })),
        (None, None) => Ok(None),
        _ => Err(AppError::IncompleteTimeRange(format!(
            "{} and {} must be provided together",
            start_name, end_name
        ))),
    }
}

fn parse_param(name: &'static str, raw: Option<&str>) -> Result<Option<NaiveDateTime>, AppError> {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(None),
    };
    parse_local_datetime(raw)
        .filter(|dt| SUPPORTED_YEARS.contains(&dt.year()))
        .map(Some)
        .ok_or_else(|| AppError::InvalidParameter {
            name,
            reason: format!(
                "expected an ISO-8601 datetime such as 2025-10-01T00:00:00, got '{}'",
                raw
            ),
        })
}

/// Parse a client-supplied timestamp into local wall time.
///
/// Naive values are taken as local. Values carrying an offset are moved
/// into the local offset. A bare date means midnight.
pub fn parse_local_datetime(raw: &str) -> Option<NaiveDateTime> {
    const NAIVE_FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        let local = FixedOffset::east_opt((LOCAL_UTC_OFFSET_HOURS * 3600) as i32)?;
        return Some(dt.with_timezone(&local).naive_local());
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
