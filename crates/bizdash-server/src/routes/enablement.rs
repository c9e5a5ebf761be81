use axum::extract::{Path, State};
use axum::Json;
use bizdash_core::cache::CacheKey;
use bizdash_core::parse::{parse_lines, parse_objections};
use bizdash_core::record::EnablementEntry;
use bizdash_core::types::{EnablementSection, Tab};
use serde::Deserialize;

use super::blocking;
use crate::error::AppError;
use crate::state::AppState;

fn section_view(entry: &EnablementEntry) -> serde_json::Value {
    let objections = match entry.section {
        EnablementSection::ObjectionHandling => parse_objections(&entry.body),
        _ => Vec::new(),
    };
    serde_json::json!({
        "section": entry.section,
        "entry": entry,
        "lines": parse_lines(&entry.body),
        "objections": objections,
    })
}

/// GET /api/enablement: every section, empty ones included.
pub async fn list_sections(
    State(app): State<AppState>,
) -> Result<Json<Vec<serde_json::Value>>, AppError> {
    let repo = app.repo.clone();
    let cache = app.cache.clone();
    let entries: Vec<EnablementEntry> = blocking(move || {
        cache.get_or_load(CacheKey::all(Tab::Enablement), || {
            EnablementSection::all()
                .iter()
                .map(|s| repo.enablement_section(*s))
                .collect()
        })
    })
    .await?;
    Ok(Json(entries.iter().map(section_view).collect()))
}

#[derive(Debug, Deserialize)]
pub struct SectionBody {
    pub body: String,
}

/// PUT /api/enablement/:section
pub async fn put_section(
    State(app): State<AppState>,
    Path(section): Path<String>,
    Json(payload): Json<SectionBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let section: EnablementSection = section.parse()?;
    let repo = app.repo.clone();
    let cache = app.cache.clone();
    let saved = blocking(move || {
        let saved = repo.save_enablement(section, payload.body)?;
        cache.invalidate_tab(Tab::Enablement);
        Ok(saved)
    })
    .await?;
    tracing::info!(%section, "saved enablement section");
    Ok(Json(section_view(&saved)))
}
