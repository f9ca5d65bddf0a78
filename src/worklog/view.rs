use anyhow::anyhow;
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::worklog::WorkLogRow;
use crate::worklog::query::local_offset;

/// Returned instead of an empty `data` array.
pub const NO_MATCH_MESSAGE: &str = "no matching logs found";

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A work log as presented to API clients.
#[derive(Debug, Clone, Serialize)]
pub struct WorkLogView {
    pub log_id: String,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub details: String,
    pub audit_status: Option<i32>,
    pub start_time: String,
    pub end_time: String,
    pub work_time: i32,
    pub remark: Option<String>,
    /// Outer `None` omits the field; `Some(None)` renders `null`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Option<String>>,
}

impl WorkLogView {
    pub fn from_row(row: WorkLogRow, include_created_at: bool) -> Result<Self, AppError> {
        let created_at = if include_created_at {
            Some(row.created_at.map(utc_to_local).transpose()?)
        } else {
            None
        };

        Ok(Self {
            log_id: row.log_id.to_string(),
            user_id: row.user_id.map(|id| id.to_string()),
            username: row.username,
            details: row.details,
            audit_status: row.audit_status,
            start_time: row.start_time.format(TIMESTAMP_FORMAT).to_string(),
            end_time: row.end_time.format(TIMESTAMP_FORMAT).to_string(),
            work_time: row.work_time,
            remark: row.remark,
            created_at,
        })
    }
}

fn utc_to_local(utc: NaiveDateTime) -> Result<String, AppError> {
    utc.checked_add_signed(local_offset())
        .map(|local| local.format(TIMESTAMP_FORMAT).to_string())
        .ok_or_else(|| AppError::Internal(anyhow!("created_at {} out of range for local time", utc)))
}

/// Body of `GET /api/worklogs`. Callers branch on the presence of `data`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum WorklogResponse {
    Found { count: usize, data: Vec<WorkLogView> },
    Empty { message: &'static str },
}

impl WorklogResponse {
    pub fn from_rows(rows: Vec<WorkLogRow>, include_created_at: bool) -> Result<Self, AppError> {
        if rows.is_empty() {
            return Ok(WorklogResponse::Empty {
                message: NO_MATCH_MESSAGE,
            });
        }

        let data = rows
            .into_iter()
            .map(|row| WorkLogView::from_row(row, include_created_at))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(WorklogResponse::Found {
            count: data.len(),
            data,
        })
    }
}
