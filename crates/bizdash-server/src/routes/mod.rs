pub mod associations;
pub mod config;
pub mod enablement;
pub mod events;
pub mod issues;
pub mod level10;
pub mod rocks;
pub mod targets;
pub mod vto;
pub mod week;

use axum::Json;
use bizdash_core::cache::CacheKey;
use bizdash_core::record::Record;
use bizdash_core::store::Query;
use bizdash_core::types::Tab;

use crate::error::AppError;
use crate::state::AppState;

/// Run store work off the async executor; the store clients block.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, AppError>
where
    F: FnOnce() -> bizdash_core::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
    Ok(result?)
}

/// Whole table through the tab cache, ordered by `order` ascending.
pub(crate) async fn list_cached<T: Record>(
    app: &AppState,
    tab: Tab,
    order: &'static str,
) -> Result<Vec<T>, AppError> {
    let repo = app.repo.clone();
    let cache = app.cache.clone();
    blocking(move || {
        cache.get_or_load(CacheKey::all(tab), || {
            repo.list::<T>(&Query::all().order_by(order, false))
        })
    })
    .await
}

/// Insert a new record and drop the tab's cached views.
pub(crate) async fn create_record<T: Record>(
    app: &AppState,
    tab: Tab,
    record: T,
) -> Result<Json<T>, AppError> {
    if record.id().is_some() {
        return Err(AppError(
            bizdash_core::DashError::invalid("id", "must not be set on create").into(),
        ));
    }
    let repo = app.repo.clone();
    let cache = app.cache.clone();
    let saved = blocking(move || {
        let saved = repo.save(record)?;
        cache.invalidate_tab(tab);
        Ok(saved)
    })
    .await?;
    Ok(Json(saved))
}

/// Replace the record at `id` with `record` and drop the tab's cached views.
pub(crate) async fn update_record<T: Record>(
    app: &AppState,
    tab: Tab,
    id: String,
    mut record: T,
) -> Result<Json<T>, AppError> {
    let repo = app.repo.clone();
    let cache = app.cache.clone();
    let saved = blocking(move || {
        repo.get::<T>(&id)?;
        record.set_id(id);
        let saved = repo.save(record)?;
        cache.invalidate_tab(tab);
        Ok(saved)
    })
    .await?;
    Ok(Json(saved))
}

pub(crate) async fn delete_record<T: Record>(
    app: &AppState,
    tab: Tab,
    id: String,
) -> Result<Json<serde_json::Value>, AppError> {
    let repo = app.repo.clone();
    let cache = app.cache.clone();
    blocking(move || {
        repo.delete::<T>(&id)?;
        cache.invalidate_tab(tab);
        Ok(serde_json::json!({ "deleted": id }))
    })
    .await
    .map(Json)
}
