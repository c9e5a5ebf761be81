use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/config: effective config with secrets masked, plus warnings.
pub async fn get_config(State(app): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    Ok(Json(serde_json::json!({
        "config": app.config.redacted(),
        "backend": app.repo.store().name(),
        "warnings": app.config.validate(),
        "cache": app.cache.stats(),
    })))
}
