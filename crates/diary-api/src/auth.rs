use std::sync::Arc;

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;

use diary_db::Database;
use diary_db::queries::is_constraint_violation;
use diary_types::api::{AuthResponse, LoginRequest, ProfileResponse, RegisterRequest, UserSummary};

use crate::blocking;
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::password::{hash_password, verify_password};
use crate::token::TokenService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
}

pub async fn register(
    State(state): State<AppState>,
    req: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ERR: &str = "Error creating user";

    let Json(req) = req?;
    let (email, password) = credentials(req.email, req.password)?;
    let name = req.name.filter(|n| !n.is_empty());

    // Check if email is taken
    let db = state.clone();
    let lookup = email.clone();
    if blocking(ERR, move || db.db.get_user_by_email(&lookup)).await?.is_some() {
        return Err(ApiError::UserExists);
    }

    let password_hash = blocking(ERR, move || hash_password(&password)).await?;

    // The UNIQUE constraint still catches a concurrent registration.
    let db = state.clone();
    let user = blocking(ERR, move || {
        match db.db.create_user(&email, &password_hash, name.as_deref(), Utc::now()) {
            Ok(row) => Ok(Some(row)),
            Err(e) if is_constraint_violation(&e) => Ok(None),
            Err(e) => Err(e),
        }
    })
    .await?
    .ok_or(ApiError::UserExists)?;

    let token = state.tokens.issue(user.id).map_err(|e| ApiError::internal(ERR, e))?;

    info!("Registered user {} ({})", user.id, user.email);

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserSummary {
                id: user.id,
                email: user.email,
                name: user.name,
            },
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    req: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    const ERR: &str = "Error logging in";

    let Json(req) = req?;
    let (email, password) = credentials(req.email, req.password)?;

    let db = state.clone();
    let user = blocking(ERR, move || db.db.get_user_by_email(&email))
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    let digest = user.password.clone();
    if !blocking(ERR, move || verify_password(&password, &digest)).await? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(user.id).map_err(|e| ApiError::internal(ERR, e))?;

    info!("User {} logged in", user.id);

    Ok(Json(AuthResponse {
        token,
        user: UserSummary {
            id: user.id,
            email: user.email,
            name: user.name,
        },
    }))
}

pub async fn profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    const ERR: &str = "Error fetching profile";

    let db = state.clone();
    let user = blocking(ERR, move || db.db.get_user_by_id(user_id))
        .await?
        .ok_or(ApiError::NotFound("User"))?
        .into_user()
        .map_err(|e| ApiError::internal(ERR, e))?;

    Ok(Json(ProfileResponse {
        id: user.id,
        email: user.email,
        name: user.name,
        created_at: user.created_at,
    }))
}

/// Both fields must be present and non-empty.
fn credentials(email: Option<String>, password: Option<String>) -> Result<(String, String), ApiError> {
    match (email, password) {
        (Some(email), Some(password)) if !email.is_empty() && !password.is_empty() => Ok((email, password)),
        _ => Err(ApiError::MissingCredentials),
    }
}
