use axum::extract::{Path, Query, State};
use axum::Json;
use bizdash_core::cache::CacheKey;
use bizdash_core::record::Rock;
use bizdash_core::summary::RockSummary;
use bizdash_core::types::Tab;
use bizdash_core::week::Quarter;
use serde::Deserialize;

use super::{blocking, create_record, delete_record, update_record};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct QuarterParams {
    pub quarter: Option<String>,
}

fn resolve_quarter(raw: Option<&str>) -> Result<Quarter, AppError> {
    match raw {
        Some(s) if !s.trim().is_empty() => Ok(Quarter::parse(s)?),
        _ => Ok(Quarter::current()),
    }
}

async fn cached_rocks(app: &AppState, quarter: Quarter) -> Result<Vec<Rock>, AppError> {
    let repo = app.repo.clone();
    let cache = app.cache.clone();
    blocking(move || {
        cache.get_or_load(CacheKey::quarter(Tab::Rocks, quarter), || {
            repo.rocks_for_quarter(quarter)
        })
    })
    .await
}

/// GET /api/rocks?quarter=2025-Q1
pub async fn list_rocks(
    State(app): State<AppState>,
    Query(params): Query<QuarterParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let quarter = resolve_quarter(params.quarter.as_deref())?;
    let rocks = cached_rocks(&app, quarter).await?;
    Ok(Json(serde_json::json!({
        "quarter": quarter,
        "start": quarter.start()?,
        "end": quarter.end()?,
        "prev": quarter.prev(),
        "next": quarter.next(),
        "rocks": rocks,
    })))
}

/// POST /api/rocks
pub async fn create_rock(
    State(app): State<AppState>,
    Json(rock): Json<Rock>,
) -> Result<Json<Rock>, AppError> {
    create_record(&app, Tab::Rocks, rock).await
}

/// PUT /api/rocks/:id
pub async fn update_rock(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(rock): Json<Rock>,
) -> Result<Json<Rock>, AppError> {
    update_record(&app, Tab::Rocks, id, rock).await
}

/// DELETE /api/rocks/:id
pub async fn delete_rock(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    delete_record::<Rock>(&app, Tab::Rocks, id).await
}

/// GET /api/rocks/summary?quarter=
pub async fn get_summary(
    State(app): State<AppState>,
    Query(params): Query<QuarterParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let quarter = resolve_quarter(params.quarter.as_deref())?;
    let rocks = cached_rocks(&app, quarter).await?;
    Ok(Json(serde_json::json!({
        "quarter": quarter,
        "summary": RockSummary::of(&rocks),
    })))
}
