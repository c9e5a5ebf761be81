use axum::extract::{Query, State};
use axum::Json;
use bizdash_core::cache::CacheKey;
use bizdash_core::parse::{parse_attendees, parse_lines, parse_scorecard, parse_todos};
use bizdash_core::record::Level10Meeting;
use bizdash_core::summary::{average_rating, MeetingSummary};
use bizdash_core::types::Tab;
use bizdash_core::week::Week;

use super::blocking;
use super::week::{resolve_week, WeekInfo, WeekParams};
use crate::error::AppError;
use crate::state::AppState;

async fn cached_meeting(app: &AppState, week: Week) -> Result<Level10Meeting, AppError> {
    let repo = app.repo.clone();
    let cache = app.cache.clone();
    blocking(move || {
        cache.get_or_load(CacheKey::week(Tab::Level10, week), || {
            Ok(repo
                .meeting_for_week(week)?
                .unwrap_or_else(|| Level10Meeting::new(week)))
        })
    })
    .await
}

/// GET /api/level10?week=: the week's meeting, or an empty template.
pub async fn get_meeting(
    State(app): State<AppState>,
    Query(params): Query<WeekParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let week = resolve_week(params.week.as_deref())?;
    let meeting = cached_meeting(&app, week).await?;
    Ok(Json(serde_json::json!({
        "week": WeekInfo::from(week),
        "saved": meeting.id.is_some(),
        "meeting": meeting,
    })))
}

/// PUT /api/level10: save the meeting for its week. The cache shows the
/// new content at once and rolls back if the backend refuses it.
pub async fn put_meeting(
    State(app): State<AppState>,
    Json(meeting): Json<Level10Meeting>,
) -> Result<Json<Level10Meeting>, AppError> {
    let repo = app.repo.clone();
    let cache = app.cache.clone();
    let saved = blocking(move || {
        let key = CacheKey::week(Tab::Level10, meeting.week_start);
        cache.put_optimistic(key, &meeting, || repo.save_meeting(meeting.clone()))
    })
    .await?;
    tracing::info!(week = %saved.week_start, "saved level 10 meeting");
    Ok(Json(saved))
}

/// GET /api/level10/summary?week=: parsed sections and headline numbers.
pub async fn get_summary(
    State(app): State<AppState>,
    Query(params): Query<WeekParams>,
) -> Result<Json<serde_json::Value>, AppError> {
    let week = resolve_week(params.week.as_deref())?;
    let meeting = cached_meeting(&app, week).await?;
    Ok(Json(serde_json::json!({
        "week": WeekInfo::from(week),
        "summary": MeetingSummary::of(&meeting),
        "attendees": parse_attendees(&meeting.attendees),
        "scorecard": parse_scorecard(&meeting.scorecard),
        "todos": parse_todos(&meeting.todos),
        "headlines": parse_lines(&meeting.headlines),
        "rock_review": parse_lines(&meeting.rock_review),
    })))
}

/// GET /api/level10/ratings: rating history across all weeks.
pub async fn get_ratings(
    State(app): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let repo = app.repo.clone();
    let meetings = blocking(move || repo.all_meetings()).await?;
    let history: Vec<serde_json::Value> = meetings
        .iter()
        .filter(|m| m.rating.is_some())
        .map(|m| serde_json::json!({ "week": m.week_start, "rating": m.rating }))
        .collect();
    Ok(Json(serde_json::json!({
        "average": average_rating(&meetings),
        "meetings": meetings.len(),
        "history": history,
    })))
}
