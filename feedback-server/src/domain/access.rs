//! Ownership rules shared by every identity-scoped operation.
//!
//! Checks run in a fixed order: an anonymous caller is always reported as
//! [`DomainError::Unauthorized`], even when the resource belongs to someone
//! else; only an identified caller can be [`DomainError::Forbidden`].

use super::error::DomainError;
use super::post::Post;

/// Requires some session identity, regardless of ownership.
pub(crate) fn require_identity(identity: Option<&str>) -> Result<&str, DomainError> {
    identity.ok_or(DomainError::Unauthorized)
}

/// Requires the session identity to be exactly `owner`.
pub(crate) fn authorize_owner<'a>(
    identity: Option<&'a str>,
    owner: &str,
) -> Result<&'a str, DomainError> {
    let actor = require_identity(identity)?;
    if actor != owner {
        return Err(DomainError::Forbidden);
    }
    Ok(actor)
}

pub(crate) fn can_mutate(identity: Option<&str>, post: &Post) -> bool {
    identity.is_some_and(|actor| post.is_owned_by(actor))
}

pub(crate) fn can_manage_user(identity: Option<&str>, username: &str) -> bool {
    identity == Some(username)
}
