pub(crate) mod auth_service;
pub(crate) mod feedback_service;
