//! API route handlers.

pub mod auth;
pub mod campaigns;

use crate::auth::middleware::{AppState, AuthSession};
use crate::error::AppError;
use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

/// Unknown paths and unsupported methods on campaign paths still require a
/// session; authenticated callers get 405.
async fn method_not_allowed(_session: AuthSession) -> Result<impl IntoResponse, AppError> {
    Ok((
        StatusCode::METHOD_NOT_ALLOWED,
        axum::Json(serde_json::json!({ "error": "Method not allowed" })),
    ))
}

/// Build the API router with all endpoints.
pub fn api_router() -> Router<AppState> {
    Router::new()
        // Auth endpoint
        .route("/auth", post(auth::authenticate))
        // Campaign endpoints
        .route(
            "/campaigns",
            get(campaigns::list_campaigns)
                .post(campaigns::create_campaign)
                .fallback(method_not_allowed),
        )
        .route(
            "/campaigns/{id}",
            get(campaigns::get_campaign)
                .put(campaigns::update_campaign)
                .delete(campaigns::delete_campaign)
                .fallback(method_not_allowed),
        )
        .fallback(method_not_allowed)
}
