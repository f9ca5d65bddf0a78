use async_trait::async_trait;

use crate::models::worklog::WorkLogRow;
use crate::worklog::query::WorklogFilter;

pub mod postgres;

/// Read access to the work log table.
#[async_trait]
pub trait WorklogStore: Send + Sync {
    /// Rows matching `filter`, newest `start_time` first.
    async fn query_worklogs(&self, filter: &WorklogFilter) -> Result<Vec<WorkLogRow>, sqlx::Error>;

    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), sqlx::Error>;
}
