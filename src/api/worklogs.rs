use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Extension, Json,
};

use crate::auth::token::Claims;
use crate::errors::AppError;
use crate::worklog::query::WorklogQuery;
use crate::worklog::view::WorklogResponse;
use crate::AppState;

/// GET /api/worklogs: work logs in a work and/or creation window,
/// optionally narrowed to usernames containing `username`
pub async fn list_worklogs(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<Claims>,
    params: Result<Query<WorklogQuery>, QueryRejection>,
) -> Result<Json<WorklogResponse>, AppError> {
    let Query(params) = params.map_err(|rejection| AppError::InvalidParameter {
        name: "query",
        reason: rejection.body_text(),
    })?;

    let filter = params.into_filter().map_err(|e| {
        tracing::warn!(user = %claims.sub, "worklog query rejected: {}", e);
        e
    })?;

    let rows = state.store.query_worklogs(&filter).await?;
    tracing::debug!(user = %claims.sub, matched = rows.len(), "worklog query");

    Ok(Json(WorklogResponse::from_rows(
        rows,
        filter.includes_created_at(),
    )?))
}
