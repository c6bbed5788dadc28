use diary_types::models::{Entry, EntryId, UserId};

use crate::auth::AppState;
use crate::blocking;
use crate::error::ApiError;
use crate::middleware::AuthUser;

/// Both the path id and the caller must be present before the store is touched.
/// A non-numeric id counts as missing.
pub fn require_ids(raw_id: Option<&str>, user: Option<AuthUser>) -> Result<(EntryId, UserId), ApiError> {
    let entry_id = raw_id
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .and_then(|id| id.parse::<EntryId>().ok())
        .ok_or(ApiError::InvalidRequest)?;
    let AuthUser(user_id) = user.ok_or(ApiError::InvalidRequest)?;

    Ok((entry_id, user_id))
}

/// Load the entry only if `user_id` owns it. Someone else's entry is
/// reported exactly like a missing one.
pub async fn owned_entry(
    state: &AppState,
    entry_id: EntryId,
    user_id: UserId,
    err: &'static str,
) -> Result<Entry, ApiError> {
    let db = state.clone();
    blocking(err, move || db.db.find_entry_for_user(entry_id, user_id))
        .await?
        .ok_or(ApiError::NotFound("Entry"))?
        .into_entry()
        .map_err(|e| ApiError::internal(err, e))
}
