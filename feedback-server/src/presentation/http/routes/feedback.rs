use axum::{
    Router,
    routing::{get, post},
};

use crate::presentation::AppState;
use crate::presentation::http::handlers::feedback::{
    delete_feedback, edit_feedback_form, update_feedback,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/{id}/update", get(edit_feedback_form).post(update_feedback))
        .route("/{id}/delete", post(delete_feedback))
}
