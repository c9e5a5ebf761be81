use axum::extract::{Path, Query, State};
use axum::Json;
use bizdash_core::record::Target;
use bizdash_core::summary::PipelineSummary;
use bizdash_core::types::{Tab, TargetStage};
use serde::Deserialize;

use super::{create_record, delete_record, list_cached, update_record};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StageFilter {
    pub stage: Option<TargetStage>,
}

/// GET /api/targets?stage=
pub async fn list_targets(
    State(app): State<AppState>,
    Query(filter): Query<StageFilter>,
) -> Result<Json<Vec<Target>>, AppError> {
    let mut targets: Vec<Target> = list_cached(&app, Tab::Targets, "company").await?;
    if let Some(stage) = filter.stage {
        targets.retain(|t| t.stage == stage);
    }
    Ok(Json(targets))
}

/// POST /api/targets
pub async fn create_target(
    State(app): State<AppState>,
    Json(target): Json<Target>,
) -> Result<Json<Target>, AppError> {
    create_record(&app, Tab::Targets, target).await
}

/// PUT /api/targets/:id
pub async fn update_target(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(target): Json<Target>,
) -> Result<Json<Target>, AppError> {
    update_record(&app, Tab::Targets, id, target).await
}

/// DELETE /api/targets/:id
pub async fn delete_target(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    delete_record::<Target>(&app, Tab::Targets, id).await
}

/// GET /api/targets/summary: pipeline by stage.
pub async fn get_summary(State(app): State<AppState>) -> Result<Json<PipelineSummary>, AppError> {
    let targets: Vec<Target> = list_cached(&app, Tab::Targets, "company").await?;
    Ok(Json(PipelineSummary::of(&targets)))
}
