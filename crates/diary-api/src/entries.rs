use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;

use diary_types::api::{EntryQuery, EntryRequest, MessageResponse};
use diary_types::models::Entry;

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::filter::build_filter;
use crate::guard::{owned_entry, require_ids};
use crate::middleware::AuthUser;
use crate::validate::{merge_update, validate_new_entry};

pub async fn create_entry(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    req: Result<Json<EntryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ERR: &str = "Error creating entry";

    let Json(req) = req?;
    let new_entry = validate_new_entry(req)?;

    let db = state.clone();
    let entry = blocking(ERR, move || db.db.insert_entry(user_id, &new_entry, Utc::now())?.into_entry()).await?;

    info!("User {} created {} entry {}", user_id, entry.entry_type, entry.id);

    Ok((StatusCode::CREATED, Json(entry)))
}

/// GET /api/entries: newest first, optionally filtered by day, range or type.
pub async fn list_entries(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    query: Result<Query<EntryQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ERR: &str = "Error fetching entries";

    let Query(query) = query?;
    let filter = build_filter(user_id, &query)?;

    let db = state.clone();
    let entries = blocking(ERR, move || {
        db.db
            .list_entries(&filter)?
            .into_iter()
            .map(|row| row.into_entry())
            .collect::<anyhow::Result<Vec<Entry>>>()
    })
    .await?;

    Ok(Json(entries))
}

pub async fn get_entry(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    user: Option<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let Path(id) = id?;
    let (entry_id, user_id) = require_ids(Some(&id), user)?;
    let entry = owned_entry(&state, entry_id, user_id, "Error fetching entry").await?;
    Ok(Json(entry))
}

/// PUT /api/entries/{id}: partial update of an entry the caller owns.
pub async fn update_entry(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    user: Option<AuthUser>,
    req: Result<Json<EntryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ERR: &str = "Error updating entry";

    let Path(id) = id?;
    let (entry_id, user_id) = require_ids(Some(&id), user)?;
    let Json(req) = req?;
    let mut entry = owned_entry(&state, entry_id, user_id, ERR).await?;

    merge_update(&mut entry, req)?;

    // Ownership was proven above; the write goes by id alone.
    let db = state.clone();
    let updated = entry.clone();
    blocking(ERR, move || db.db.update_entry(&updated)).await?;

    info!("User {} updated entry {}", user_id, entry_id);

    Ok(Json(entry))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    user: Option<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    const ERR: &str = "Error deleting entry";

    let Path(id) = id?;
    let (entry_id, user_id) = require_ids(Some(&id), user)?;
    owned_entry(&state, entry_id, user_id, ERR).await?;

    let db = state.clone();
    blocking(ERR, move || db.db.delete_entry(entry_id)).await?;

    info!("User {} deleted entry {}", user_id, entry_id);

    Ok(Json(MessageResponse {
        message: "Entry deleted successfully".to_string(),
    }))
}
