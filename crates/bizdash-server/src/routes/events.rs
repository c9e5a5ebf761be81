use axum::extract::{Path, Query, State};
use axum::Json;
use bizdash_core::calendar::{parse_month, upcoming, MonthGrid};
use bizdash_core::record::AssociationEvent;
use bizdash_core::types::Tab;
use chrono::Datelike;
use serde::Deserialize;

use super::{create_record, delete_record, list_cached, update_record};
use crate::error::AppError;
use crate::state::AppState;

async fn all_events(app: &AppState) -> Result<Vec<AssociationEvent>, AppError> {
    list_cached(app, Tab::Events, "event_date").await
}

/// GET /api/events
pub async fn list_events(
    State(app): State<AppState>,
) -> Result<Json<Vec<AssociationEvent>>, AppError> {
    Ok(Json(all_events(&app).await?))
}

#[derive(Debug, Deserialize)]
pub struct MonthParams {
    pub year: Option<i32>,
    pub month: Option<String>,
}

fn resolve_month(params: &MonthParams, today: chrono::NaiveDate) -> Result<(i32, u32), AppError> {
    match (&params.month, params.year) {
        (Some(m), _) if m.contains('-') => Ok(parse_month(m)?),
        (Some(m), year) => {
            let month: u32 = m.trim().parse().map_err(|_| {
                bizdash_core::DashError::invalid("month", format!("'{m}' is not a month"))
            })?;
            let year = year.unwrap_or_else(|| today.year());
            bizdash_core::calendar::month_bounds(year, month)?;
            Ok((year, month))
        }
        (None, Some(year)) => Ok((year, today.month())),
        (None, None) => Ok((today.year(), today.month())),
    }
}

/// GET /api/events/calendar?year=2025&month=3 (or ?month=2025-03)
pub async fn get_calendar(
    State(app): State<AppState>,
    Query(params): Query<MonthParams>,
) -> Result<Json<MonthGrid>, AppError> {
    let today = chrono::Local::now().date_naive();
    let (year, month) = resolve_month(&params, today)?;
    let events = all_events(&app).await?;
    Ok(Json(MonthGrid::build(year, month, &events, today)?))
}

/// GET /api/events/upcoming
pub async fn get_upcoming(
    State(app): State<AppState>,
) -> Result<Json<Vec<AssociationEvent>>, AppError> {
    let today = chrono::Local::now().date_naive();
    let events = all_events(&app).await?;
    Ok(Json(upcoming(
        &events,
        today,
        app.config.dashboard.upcoming_events,
    )))
}

/// POST /api/events
pub async fn create_event(
    State(app): State<AppState>,
    Json(event): Json<AssociationEvent>,
) -> Result<Json<AssociationEvent>, AppError> {
    create_record(&app, Tab::Events, event).await
}

/// PUT /api/events/:id
pub async fn update_event(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(event): Json<AssociationEvent>,
) -> Result<Json<AssociationEvent>, AppError> {
    update_record(&app, Tab::Events, id, event).await
}

/// DELETE /api/events/:id
pub async fn delete_event(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    delete_record::<AssociationEvent>(&app, Tab::Events, id).await
}
