use axum::{
    Json, Router, middleware,
    routing::get,
};
use serde::Serialize;

use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;
use crate::presentation::http::handlers::feedback::feed;
use crate::presentation::http::middleware::session::resolve_session;

pub(crate) mod auth;
pub(crate) mod feedback;
pub(crate) mod users;

pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(feed))
        .route("/healthz", get(health_handler))
        .merge(auth::router())
        .nest("/users", users::router())
        .nest("/feedback", feedback::router())
        .fallback(not_found)
        .layer(middleware::from_fn_with_state(state.clone(), resolve_session))
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthzResponse {
    status: &'static str,
}

async fn health_handler() -> Json<HealthzResponse> {
    Json(HealthzResponse { status: "ok" })
}

async fn not_found() -> AppError {
    AppError::NotFound
}
