use std::sync::Arc;

use crate::application::auth_service::AuthService;
use crate::application::feedback_service::FeedbackService;
use crate::presentation::http::cookies::CookieSettings;

pub(crate) mod http;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) auth_service: Arc<AuthService>,
    pub(crate) feedback_service: Arc<FeedbackService>,
    pub(crate) cookies: CookieSettings,
}

impl AppState {
    pub(crate) fn new(
        auth_service: Arc<AuthService>,
        feedback_service: Arc<FeedbackService>,
        cookies: CookieSettings,
    ) -> Self {
        Self {
            auth_service,
            feedback_service,
            cookies,
        }
    }
}
