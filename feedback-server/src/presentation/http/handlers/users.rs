use axum::{
    extract::{Path, State},
    response::Response,
};

use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, redirect_with_cookies};
use crate::presentation::http::cookies::notice_cookie;
use crate::presentation::http::middleware::session::Viewer;
use crate::presentation::http::notice::Notice;
use crate::presentation::http::views::{self, Page};

pub(crate) async fn show_user(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
) -> AppResult<Page> {
    let page = state
        .feedback_service
        .user_page(viewer.identity(), &username)
        .await?;

    Ok(views::user_page(&viewer, &page))
}

/// Deletes the account with all of its feedback and ends the session.
pub(crate) async fn delete_user(
    State(state): State<AppState>,
    viewer: Viewer,
    Path(username): Path<String>,
) -> AppResult<Response> {
    state
        .feedback_service
        .delete_user(viewer.identity(), &username)
        .await?;

    Ok(redirect_with_cookies(
        "/",
        [
            state.cookies.end_session(),
            notice_cookie(Notice::AccountDeleted),
        ],
    ))
}
