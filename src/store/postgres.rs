use async_trait::async_trait;
use sqlx::PgPool;

use super::WorklogStore;
use crate::models::worklog::WorkLogRow;
use crate::worklog::query::WorklogFilter;

// Absent bounds bind as NULL and switch their predicate off. The LEFT JOIN
// keeps logs whose owner was deleted; they surface with a NULL username.
const WORKLOG_QUERY: &str = r#"SELECT w.log_id, w.user_id, u.username, w.details, w.audit_status,
          w.start_time, w.end_time, w.work_time, w.remark, w.created_at
   FROM work_logs w
   LEFT JOIN system_users u ON u.user_id = w.user_id
   WHERE ($1::timestamp IS NULL OR w.start_time >= $1)
     AND ($2::timestamp IS NULL OR w.end_time <= $2)
     AND ($3::timestamp IS NULL OR w.created_at >= $3)
     AND ($4::timestamp IS NULL OR w.created_at <= $4)
     AND ($5::text IS NULL OR u.username ILIKE '%' || $5 || '%')
   ORDER BY w.start_time DESC"#;

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run pending migrations from the migrations/ directory.
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl WorklogStore for PgStore {
    async fn query_worklogs(&self, filter: &WorklogFilter) -> Result<Vec<WorkLogRow>, sqlx::Error> {
        let work = filter.work_window;
        let created = filter.created_window;

        sqlx::query_as::<_, WorkLogRow>(WORKLOG_QUERY)
            .bind(work.map(|w| w.start))
            .bind(work.map(|w| w.end))
            .bind(created.map(|w| w.start))
            .bind(created.map(|w| w.end))
            .bind(filter.username.as_deref())
            .fetch_all(&self.pool)
            .await
    }

    async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
