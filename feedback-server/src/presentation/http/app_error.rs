use axum::{
    http::{StatusCode, header},
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use thiserror::Error;
use tracing::error;

use super::cookies::notice_cookie;
use super::notice::Notice;
use super::views::error_page;
use crate::domain::error::DomainError;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("not found")]
    NotFound,

    #[error("unauthorized")]
    Unauthorized,
}

pub(crate) type AppResult<T> = Result<T, AppError>;

/// `303 See Other` to `to`, setting each of `cookies`.
pub(crate) fn redirect_with_cookies(
    to: &str,
    cookies: impl IntoIterator<Item = String>,
) -> Response {
    let headers: Vec<_> = cookies
        .into_iter()
        .map(|cookie| (header::SET_COOKIE, cookie))
        .collect();
    (AppendHeaders(headers), Redirect::to(to)).into_response()
}

pub(crate) fn redirect_with_notice(to: &str, notice: Notice) -> Response {
    redirect_with_cookies(to, [notice_cookie(notice)])
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Unauthorized | AppError::Domain(DomainError::Unauthorized) => {
                redirect_with_notice("/login", Notice::LoginRequired)
            }
            AppError::Domain(DomainError::Forbidden) => redirect_with_notice("/", Notice::Forbidden),
            AppError::NotFound | AppError::Domain(DomainError::NotFound(_)) => {
                error_page(StatusCode::NOT_FOUND, "The page you asked for does not exist.")
                    .into_response()
            }
            // handlers re-render their forms for these; anything left is a bad request
            AppError::Domain(
                err @ (DomainError::Validation { .. }
                | DomainError::AlreadyExists(_)
                | DomainError::InvalidCredentials),
            ) => error_page(StatusCode::BAD_REQUEST, &err.to_string()).into_response(),
            AppError::Domain(DomainError::Unexpected(message)) => {
                error!(error = %message, "request failed");
                error_page(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again later.",
                )
                .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{StatusCode, header};
    use axum::response::IntoResponse;

    use super::AppError;
    use crate::domain::error::DomainError;

    #[test]
    fn unauthorized_redirects_to_login_with_notice() {
        let response = AppError::Domain(DomainError::Unauthorized).into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/login");
        let cookie = response.headers()[header::SET_COOKIE]
            .to_str()
            .expect("cookie must be ascii");
        assert!(cookie.starts_with("notice=login-required;"));
    }

    #[test]
    fn forbidden_redirects_to_feed() {
        let response = AppError::Domain(DomainError::Forbidden).into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[header::LOCATION], "/");
    }

    #[test]
    fn not_found_and_unexpected_map_to_status_pages() {
        let response = AppError::Domain(DomainError::NotFound("post".into())).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = AppError::Domain(DomainError::Unexpected("db down".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unhandled_form_errors_are_bad_requests() {
        for err in [
            DomainError::InvalidCredentials,
            DomainError::AlreadyExists("email"),
            DomainError::Validation {
                field: "title",
                message: "is required",
            },
        ] {
            let response = AppError::Domain(err).into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }
}
