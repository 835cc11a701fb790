pub(crate) mod auth;
pub(crate) mod feedback;
pub(crate) mod users;
