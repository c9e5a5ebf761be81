use axum::extract::{Query, State};
use axum::Json;
use bizdash_core::cache::CacheKey;
use bizdash_core::parse::{parse_lines, parse_money};
use bizdash_core::record::YearlyGoals;
use bizdash_core::types::Tab;
use chrono::Datelike;
use serde::Deserialize;

use super::blocking;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct YearParams {
    pub year: Option<i32>,
}

fn goals_view(goals: &YearlyGoals) -> serde_json::Value {
    serde_json::json!({
        "record": goals,
        "saved": goals.id.is_some(),
        "goals": parse_lines(&goals.goals),
        "measurables": parse_lines(&goals.measurables),
        "revenue_target_value": parse_money(&goals.revenue_target),
        "profit_target_value": parse_money(&goals.profit_target),
    })
}

/// GET /api/vto?year=: yearly goals, defaulting to the current year.
pub async fn get_goals(
    State(app): State<AppState>,
    Query(params): Query<YearParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let year = params
        .year
        .unwrap_or_else(|| chrono::Local::now().date_naive().year());
    let repo = app.repo.clone();
    let cache = app.cache.clone();
    let goals = blocking(move || {
        cache.get_or_load(CacheKey::year(Tab::Vto, year), || {
            Ok(repo
                .goals_for_year(year)?
                .unwrap_or_else(|| YearlyGoals::new(year)))
        })
    })
    .await?;
    Ok(Json(goals_view(&goals)))
}

/// PUT /api/vto: save the goals for their year.
pub async fn put_goals(
    State(app): State<AppState>,
    Json(goals): Json<YearlyGoals>,
) -> Result<Json<serde_json::Value>, AppError> {
    let repo = app.repo.clone();
    let cache = app.cache.clone();
    let saved = blocking(move || {
        let key = CacheKey::year(Tab::Vto, goals.year);
        cache.put_optimistic(key, &goals, || repo.save_goals(goals.clone()))
    })
    .await?;
    Ok(Json(goals_view(&saved)))
}
