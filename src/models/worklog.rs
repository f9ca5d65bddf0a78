use chrono::NaiveDateTime;
use uuid::Uuid;

/// One `work_logs` row joined with its owner's username.
///
/// `start_time`/`end_time` are local wall time; `created_at` is UTC.
/// Nothing enforces `end_time > start_time`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkLogRow {
    pub log_id: Uuid,
    /// Null once the owning user has been deleted.
    pub user_id: Option<Uuid>,
    pub username: Option<String>,
    pub details: String,
    pub audit_status: Option<i32>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    // Unit is unresolved: the table comment says hours, the API schema says minutes.
    pub work_time: i32,
    pub remark: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}
