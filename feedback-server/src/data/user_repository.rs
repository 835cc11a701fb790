use async_trait::async_trait;

use crate::domain::error::DomainError;
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct UserCredentials {
    pub(crate) user: User,
    pub(crate) password_hash: String,
    /// Current session generation; tokens carrying any other value are stale.
    pub(crate) session_epoch: i64,
}

#[derive(Debug, Clone)]
pub(crate) struct NewUser {
    pub(crate) username: String,
    pub(crate) email: String,
    pub(crate) first_name: String,
    pub(crate) last_name: String,
    pub(crate) password_hash: String,
}

/// Session epochs come from one store-wide counter, so an account that is
/// deleted and registered again never sees an epoch it had before.
#[async_trait]
pub(crate) trait UserRepository: Send + Sync {
    /// Fails with `AlreadyExists("username" | "email")` without writing anything
    /// when either unique key is taken.
    async fn create_user(&self, input: NewUser) -> Result<UserCredentials, DomainError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<UserCredentials>, DomainError>;
    async fn get_user(&self, username: &str) -> Result<Option<User>, DomainError>;
    async fn session_epoch(&self, username: &str) -> Result<Option<i64>, DomainError>;
    /// Moves the user to a fresh epoch; `None` when the user does not exist.
    async fn rotate_session_epoch(&self, username: &str) -> Result<Option<i64>, DomainError>;
    /// Removes the user together with all of their feedback in one atomic step.
    async fn delete_user(&self, username: &str) -> Result<bool, DomainError>;
}
