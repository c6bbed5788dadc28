use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UserId;

// -- JWT Claims --

/// Payload of every bearer token. Only the user id is carried; `iat`/`exp`
/// are the standard JWT timestamps in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: UserId,
    pub iat: i64,
    pub exp: i64,
}

// -- Auth --

/// Fields are optional so that a missing email/password is reported as a
/// validation error instead of a body rejection.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
}

/// Returned by both register and login.
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub created_at: DateTime<Utc>,
}

// -- Entries --

/// Body of `POST /api/entries` and `PUT /api/entries/{id}`.
///
/// Untyped: creation runs it through validation into a tagged
/// payload, updates merge whatever is present into the stored row.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntryRequest {
    pub date: Option<String>,
    pub entry_type: Option<String>,

    pub meal_type: Option<String>,
    pub food_name: Option<String>,
    pub calories: Option<i64>,

    pub symptom_type: Option<String>,
    pub symptom_severity: Option<i64>,

    pub exercise_type: Option<String>,
    pub exercise_intensity: Option<i64>,
    pub exercise_duration: Option<i64>,

    pub notes: Option<String>,
}

/// Query string of `GET /api/entries`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryQuery {
    pub date: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub entry_type: Option<String>,
}

// -- Misc --

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}
