pub(crate) mod app_error;
pub(crate) mod cookies;
pub(crate) mod forms;
pub(crate) mod handlers;
pub(crate) mod middleware;
pub(crate) mod notice;
pub(crate) mod routes;
pub(crate) mod views;
