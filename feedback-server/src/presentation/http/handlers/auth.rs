use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use validator::Validate;

use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest};
use crate::presentation::AppState;
use crate::presentation::http::app_error::{AppResult, redirect_with_cookies};
use crate::presentation::http::cookies::notice_cookie;
use crate::presentation::http::forms::FormErrors;
use crate::presentation::http::middleware::session::{AuthenticatedUser, Viewer};
use crate::presentation::http::notice::Notice;
use crate::presentation::http::views::{self, RegisterValues};

const INVALID_LOGIN: &str = "Invalid username or password.";

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub(crate) struct RegisterForm {
    #[validate(length(min = 1, max = 20, message = "Username must be 1 to 20 characters."))]
    pub(crate) username: String,
    #[validate(length(min = 8, max = 128, message = "Password must be at least 8 characters."))]
    pub(crate) password: String,
    #[validate(
        email(message = "Enter a valid email address."),
        length(max = 50, message = "Email Address cannot exceed 50 characters.")
    )]
    pub(crate) email: String,
    #[validate(length(min = 1, max = 30, message = "First Name must be 1 to 30 characters."))]
    pub(crate) first_name: String,
    #[validate(length(min = 1, max = 30, message = "Last Name must be 1 to 30 characters."))]
    pub(crate) last_name: String,
}

impl RegisterForm {
    fn values(&self) -> RegisterValues<'_> {
        RegisterValues {
            username: &self.username,
            email: &self.email,
            first_name: &self.first_name,
            last_name: &self.last_name,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub(crate) struct LoginForm {
    #[validate(length(min = 1, max = 20, message = "Username is required."))]
    pub(crate) username: String,
    #[validate(length(min = 1, message = "Password is required."))]
    pub(crate) password: String,
}

pub(crate) fn user_path(username: &str) -> String {
    format!("/users/{username}")
}

pub(crate) async fn register_form(viewer: Viewer) -> Response {
    if let Some(username) = viewer.identity() {
        return Redirect::to(&user_path(username)).into_response();
    }
    let form = RegisterForm::default();
    views::register_page(&viewer, &form.values(), &FormErrors::default()).into_response()
}

pub(crate) async fn register(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(form): Form<RegisterForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        return Ok(views::register_page(&viewer, &form.values(), &FormErrors::from(&errors))
            .into_response());
    }

    let req = RegisterRequest {
        username: form.username.clone(),
        password: form.password.clone(),
        email: form.email.clone(),
        first_name: form.first_name.clone(),
        last_name: form.last_name.clone(),
    };

    match state.auth_service.register(req).await {
        Ok(result) => Ok(redirect_with_cookies(
            &user_path(&result.user.username),
            [
                state.cookies.start_session(&result.session_token),
                notice_cookie(Notice::Welcome),
            ],
        )),
        Err(err) => match FormErrors::from_domain(&err) {
            Some(errors) => {
                Ok(views::register_page(&viewer, &form.values(), &errors).into_response())
            }
            None => Err(err.into()),
        },
    }
}

pub(crate) async fn login_form(viewer: Viewer) -> Response {
    if let Some(username) = viewer.identity() {
        return Redirect::to(&user_path(username)).into_response();
    }
    views::login_page(&viewer, "", &FormErrors::default()).into_response()
}

pub(crate) async fn login(
    State(state): State<AppState>,
    viewer: Viewer,
    Form(form): Form<LoginForm>,
) -> AppResult<Response> {
    if let Err(errors) = form.validate() {
        return Ok(
            views::login_page(&viewer, &form.username, &FormErrors::from(&errors)).into_response(),
        );
    }

    let req = LoginRequest {
        username: form.username.clone(),
        password: form.password,
    };

    match state.auth_service.login(req).await {
        Ok(result) => Ok(redirect_with_cookies(
            &user_path(&result.user.username),
            [
                state.cookies.start_session(&result.session_token),
                notice_cookie(Notice::LoggedIn),
            ],
        )),
        // one message for every credential failure, attached to no field
        Err(DomainError::InvalidCredentials | DomainError::Validation { .. }) => Ok(
            views::login_page(&viewer, &form.username, &FormErrors::form_level(INVALID_LOGIN))
                .into_response(),
        ),
        Err(err) => Err(err.into()),
    }
}

/// Ends the session server-side, so the old token stops resolving even if a
/// client keeps sending it.
pub(crate) async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> AppResult<Response> {
    state.auth_service.end_session(&user.username).await?;

    Ok(redirect_with_cookies(
        "/",
        [
            state.cookies.end_session(),
            notice_cookie(Notice::LoggedOut),
        ],
    ))
}
