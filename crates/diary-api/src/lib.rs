pub mod auth;
pub mod entries;
pub mod error;
pub mod filter;
pub mod guard;
pub mod middleware;
pub mod password;
pub mod token;
pub mod validate;

use std::any::Any;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::catch_panic::CatchPanicLayer;
use tracing::error;

use diary_types::api::{ErrorResponse, HealthResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::middleware::require_auth;

/// Build the full HTTP surface. CORS and request tracing are added by the binary.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected_routes = Router::new()
        .route("/api/auth/profile", get(auth::profile))
        .route("/api/entries", get(entries::list_entries).post(entries::create_entry))
        .route(
            "/api/entries/{id}",
            get(entries::get_entry)
                .put(entries::update_entry)
                .delete(entries::delete_entry),
        )
        .route_layer(axum_middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Run store or hashing work off the async runtime. Any failure becomes a
/// 500 carrying `message`.
pub(crate) async fn blocking<F, T>(message: &'static str, f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ApiError::internal(message, anyhow::anyhow!("spawn_blocking join error: {}", e)))?
        .map_err(|e| ApiError::internal(message, e))
}

/// GET /health: liveness check (no auth).
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Food diary API is running".to_string(),
    })
}

async fn not_found() -> ApiError {
    ApiError::NotFound("Route")
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {}", detail);

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}
