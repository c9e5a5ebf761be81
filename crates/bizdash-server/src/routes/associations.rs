use axum::extract::{Path, State};
use axum::Json;
use bizdash_core::record::Association;
use bizdash_core::summary::AssociationSummary;
use bizdash_core::types::Tab;

use super::{create_record, delete_record, list_cached, update_record};
use crate::error::AppError;
use crate::state::AppState;

/// GET /api/associations: memberships by name.
pub async fn list_associations(
    State(app): State<AppState>,
) -> Result<Json<Vec<Association>>, AppError> {
    Ok(Json(list_cached(&app, Tab::Associations, "name").await?))
}

/// POST /api/associations
pub async fn create_association(
    State(app): State<AppState>,
    Json(assoc): Json<Association>,
) -> Result<Json<Association>, AppError> {
    create_record(&app, Tab::Associations, assoc).await
}

/// PUT /api/associations/:id
pub async fn update_association(
    State(app): State<AppState>,
    Path(id): Path<String>,
    Json(assoc): Json<Association>,
) -> Result<Json<Association>, AppError> {
    update_record(&app, Tab::Associations, id, assoc).await
}

/// DELETE /api/associations/:id
pub async fn delete_association(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    delete_record::<Association>(&app, Tab::Associations, id).await
}

/// GET /api/associations/summary: dues and renewals coming up.
pub async fn get_summary(
    State(app): State<AppState>,
) -> Result<Json<AssociationSummary>, AppError> {
    let assocs: Vec<Association> = list_cached(&app, Tab::Associations, "name").await?;
    let today = chrono::Local::now().date_naive();
    Ok(Json(AssociationSummary::of(
        &assocs,
        today,
        app.config.dashboard.renewal_window_days,
    )))
}
