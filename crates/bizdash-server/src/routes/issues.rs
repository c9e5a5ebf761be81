use axum::extract::{Path, Query, State};
use axum::Json;
use bizdash_core::cache::CacheKey;
use bizdash_core::record::Issue;
use bizdash_core::summary::{prioritize, IssueSummary};
use bizdash_core::types::{IssueStatus, Priority, Tab};
use serde::Deserialize;

use super::{blocking, create_record, delete_record, update_record};
use crate::error::AppError;
use crate::state::AppState;

async fn cached_issues(app: &AppState) -> Result<Vec<Issue>, AppError> {
    let repo = app.repo.clone();
    let cache = app.cache.clone();
    blocking(move || {
        cache.get_or_load(CacheKey::all(Tab::Issues), || repo.prioritized_issues(None))
    })
    .await
}

#[derive(Debug, Deserialize)]
pub struct IssueFilter {
    pub status: Option<IssueStatus>,
}

/// GET /api/issues?status=: open issues first, highest priority first.
pub async fn list_issues(
    State(app): State<AppState>,
    Query(filter): Query<IssueFilter>,
) -> Result<Json<Vec<Issue>>, AppError> {
    let mut issues = cached_issues(&app).await?;
    if let Some(status) = filter.status {
        issues.retain(|i| i.status == status);
    }
    prioritize(&mut issues);
    Ok(Json(issues))
}

#[derive(Debug, Deserialize)]
pub struct CreateIssueBody {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub priority: Priority,
}

/// POST /api/issues: add an open issue.
pub async fn create_issue(
    State(app): State<AppState>,
    Json(body): Json<CreateIssueBody>,
) -> Result<Json<Issue>, AppError> {
    let mut issue = Issue::new(body.title, body.priority);
    issue.description = body.description;
    issue.owner = body.owner;
    create_record(&app, Tab::Issues, issue).await
}

/// PUT /api/issues/:id: replace an issue.
pub async fn update_issue(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(issue): Json<Issue>,
) -> Result<Json<Issue>, AppError> {
    update_record(&app, Tab::Issues, id, issue).await
}

/// DELETE /api/issues/:id
pub async fn delete_issue(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    delete_record::<Issue>(&app, Tab::Issues, id).await
}

/// POST /api/issues/:id/solve: mark solved (IDS complete). Solving twice is a 400.
pub async fn solve_issue(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Issue>, AppError> {
    let repo = app.repo.clone();
    let mut issue: Issue = blocking(move || repo.get(&id)).await?;
    issue.solve()?;
    let id = issue.id.clone().unwrap_or_default();
    update_record(&app, Tab::Issues, id, issue).await
}

/// GET /api/issues/summary
pub async fn get_summary(State(app): State<AppState>) -> Result<Json<IssueSummary>, AppError> {
    let issues = cached_issues(&app).await?;
    Ok(Json(IssueSummary::of(&issues)))
}
