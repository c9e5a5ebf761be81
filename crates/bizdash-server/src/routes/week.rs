use axum::extract::Query;
use axum::Json;
use bizdash_core::week::{Quarter, Week};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct WeekParams {
    pub week: Option<String>,
}

/// `?week=` as a [`Week`], defaulting to the current one.
pub(crate) fn resolve_week(raw: Option<&str>) -> Result<Week, AppError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => Ok(Week::parse(s)?),
        None => Ok(Week::current()),
    }
}

#[derive(Debug, Serialize)]
pub struct WeekInfo {
    pub start: String,
    pub end: String,
    pub iso: String,
    pub label: String,
    pub quarter: String,
    pub prev: String,
    pub next: String,
}

impl From<Week> for WeekInfo {
    fn from(w: Week) -> Self {
        Self {
            start: w.to_string(),
            end: w.end().to_string(),
            iso: w.iso(),
            label: w.label(),
            quarter: Quarter::containing(w.start()).to_string(),
            prev: w.prev().to_string(),
            next: w.next().to_string(),
        }
    }
}

/// GET /api/week: bounds and navigation for the week selector.
pub async fn get_week(Query(params): Query<WeekParams>) -> Result<Json<WeekInfo>, AppError> {
    let week = resolve_week(params.week.as_deref())?;
    Ok(Json(WeekInfo::from(week)))
}
