use axum::{
    Router,
    routing::{get, post},
};

use crate::presentation::AppState;
use crate::presentation::http::handlers::feedback::{add_feedback, new_feedback_form};
use crate::presentation::http::handlers::users::{delete_user, show_user};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/{username}", get(show_user))
        .route("/{username}/delete", post(delete_user))
        .route(
            "/{username}/feedback/add",
            get(new_feedback_form).post(add_feedback),
        )
}
