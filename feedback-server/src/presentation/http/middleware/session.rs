use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::presentation::AppState;
use crate::presentation::http::app_error::AppError;
use crate::presentation::http::cookies::{NOTICE_COOKIE, SESSION_COOKIE, read_cookie};
use crate::presentation::http::notice::Notice;

/// Username resolved from the session cookie, `None` when anonymous.
#[derive(Debug, Clone, Default)]
pub(crate) struct SessionIdentity(pub(crate) Option<String>);

/// Resolves the session token once per request and stores the result in the
/// request extensions for the extractors below.
pub(crate) async fn resolve_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = read_cookie(request.headers(), SESSION_COOKIE);
    let identity = match state.auth_service.resolve_session(token.as_deref()).await {
        Ok(identity) => identity,
        Err(err) => return AppError::from(err).into_response(),
    };

    request.extensions_mut().insert(SessionIdentity(identity));
    next.run(request).await
}

/// Who is looking at a page, plus the pending flash notice if any.
#[derive(Debug, Clone, Default)]
pub(crate) struct Viewer {
    identity: Option<String>,
    notice: Option<Notice>,
}

impl Viewer {
    pub(crate) fn anonymous() -> Self {
        Self::default()
    }

    pub(crate) fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub(crate) fn notice(&self) -> Option<Notice> {
        self.notice
    }
}

impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let identity = parts
            .extensions
            .get::<SessionIdentity>()
            .and_then(|session| session.0.clone());
        let notice = read_cookie(&parts.headers, NOTICE_COOKIE)
            .as_deref()
            .and_then(Notice::from_code);

        Ok(Self { identity, notice })
    }
}

#[derive(Debug, Clone)]
pub(crate) struct AuthenticatedUser {
    pub(crate) username: String,
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<SessionIdentity>()
            .and_then(|session| session.0.clone())
            .map(|username| AuthenticatedUser { username })
            .ok_or(AppError::Unauthorized)
    }
}
