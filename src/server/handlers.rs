//! Handlers for the `/api/issues` routes.

use std::collections::HashMap;

use axum::Json;
use axum::extract::{Path, Query, State};
use issues_lib::{Issue, IssueError, IssueFilter, require_id};
use tracing::debug;

use super::AppState;
use super::extract::IssueFields;
use super::response::{ActionResult, ApiError};

/// GET /api/issues/
///
/// Every stored issue, unfiltered.
pub async fn list_all(State(state): State<AppState>) -> Result<Json<Vec<Issue>>, ApiError> {
    let issues = state.service.list(&IssueFilter::default()).await?;
    Ok(Json(issues))
}

/// GET /api/issues/{project}
///
/// Issues in the project matching the query parameters.
pub async fn list_issues(
    State(state): State<AppState>,
    Path(project): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Vec<Issue>>, ApiError> {
    let filter = IssueFilter::from_query(Some(&project), &params);
    let issues = state.service.list(&filter).await?;
    Ok(Json(issues))
}

/// POST /api/issues/{project}
pub async fn create_issue(
    State(state): State<AppState>,
    Path(project): Path<String>,
    fields: IssueFields,
) -> Result<Json<Issue>, ApiError> {
    let created = state.service.create(fields.to_new_issue(&project)).await?;
    Ok(Json(created))
}

/// PUT /api/issues/{project}
///
/// The project segment is not consulted; the issue is found by ID.
pub async fn update_issue(
    State(state): State<AppState>,
    fields: IssueFields,
) -> Result<Json<ActionResult>, ApiError> {
    let id = fields.issue_id();

    let patch = match fields.to_update() {
        Ok(patch) => patch,
        Err(invalid) => {
            let id = require_id(id.as_deref())?;
            debug!(id, %invalid, "update rejected: invalid field");
            return Err(IssueError::UpdateFailed { id: id.to_string() }.into());
        }
    };

    let id = state.service.update(id.as_deref(), &patch).await?;
    Ok(Json(ActionResult::updated(id)))
}

/// DELETE /api/issues/{project}
pub async fn delete_issue(
    State(state): State<AppState>,
    fields: IssueFields,
) -> Result<Json<ActionResult>, ApiError> {
    let id = state.service.delete(fields.issue_id().as_deref()).await?;
    Ok(Json(ActionResult::deleted(id)))
}
