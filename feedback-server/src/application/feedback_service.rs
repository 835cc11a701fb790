use std::sync::Arc;

use tracing::{info, warn};

use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::data::user_repository::UserRepository;
use crate::domain::access::{authorize_owner, can_manage_user, require_identity};
use crate::domain::error::DomainError;
use crate::domain::post::{CreatePostRequest, Post, UpdatePostRequest};
use crate::domain::user::User;

pub(crate) const FEED_LIMIT: u32 = 10;

#[derive(Debug, Clone)]
pub(crate) struct UserPage {
    pub(crate) user: User,
    pub(crate) posts: Vec<Post>,
    /// The viewer is the user themselves and may manage the account and its feedback.
    pub(crate) can_manage: bool,
}

/// Feed, user pages and ownership-checked feedback mutations.
///
/// Every method taking an `identity` rejects anonymous callers with
/// `Unauthorized` before non-owners with `Forbidden`. Feedback-scoped methods
/// load the post first, so a missing id is `NotFound` for everyone.
pub(crate) struct FeedbackService {
    users: Arc<dyn UserRepository>,
    posts: Arc<dyn PostRepository>,
}

impl FeedbackService {
    pub(crate) fn new(users: Arc<dyn UserRepository>, posts: Arc<dyn PostRepository>) -> Self {
        Self { users, posts }
    }

    pub(crate) async fn recent_feed(&self) -> Result<Vec<Post>, DomainError> {
        self.posts.list_recent_posts(FEED_LIMIT).await
    }

    pub(crate) async fn get_user(&self, username: &str) -> Result<User, DomainError> {
        self.users
            .get_user(username)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("user: {username}")))
    }

    pub(crate) async fn get_post(&self, id: i64) -> Result<Post, DomainError> {
        self.posts
            .get_post(id)
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("feedback id: {id}")))
    }

    pub(crate) async fn user_page(
        &self,
        identity: Option<&str>,
        username: &str,
    ) -> Result<UserPage, DomainError> {
        require_identity(identity)?;

        let user = self.get_user(username).await?;
        let posts = self.posts.list_posts_by_owner(&user.username).await?;

        Ok(UserPage {
            can_manage: can_manage_user(identity, &user.username),
            user,
            posts,
        })
    }

    pub(crate) async fn delete_user(
        &self,
        identity: Option<&str>,
        username: &str,
    ) -> Result<(), DomainError> {
        guard(identity, username, "delete user")?;

        if !self.users.delete_user(username).await? {
            return Err(DomainError::NotFound(format!("user: {username}")));
        }
        info!(%username, "user deleted with all feedback");
        Ok(())
    }

    /// Guard for showing the "add feedback" form; the same check `add_post` runs.
    pub(crate) fn authorize_new_post(
        &self,
        identity: Option<&str>,
        username: &str,
    ) -> Result<(), DomainError> {
        guard(identity, username, "add feedback").map(|_| ())
    }

    pub(crate) async fn add_post(
        &self,
        identity: Option<&str>,
        username: &str,
        req: CreatePostRequest,
    ) -> Result<Post, DomainError> {
        let owner = guard(identity, username, "add feedback")?;
        let req = req.validate()?;

        let post = self
            .posts
            .create_post(NewPost {
                title: req.title,
                content: req.content,
                owner_username: owner.to_string(),
            })
            .await?;
        info!(post_id = post.id, owner = %post.owner_username, "feedback created");
        Ok(post)
    }

    /// Loads a post for its edit form, applying the owner guard.
    pub(crate) async fn post_for_edit(
        &self,
        identity: Option<&str>,
        id: i64,
    ) -> Result<Post, DomainError> {
        let post = self.get_post(id).await?;
        guard(identity, &post.owner_username, "edit feedback")?;
        Ok(post)
    }

    pub(crate) async fn edit_post(
        &self,
        identity: Option<&str>,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<Post, DomainError> {
        self.post_for_edit(identity, id).await?;
        let req = req.validate()?;

        let post = self
            .posts
            .update_post(
                id,
                PostPatch {
                    title: req.title,
                    content: req.content,
                },
            )
            .await?
            .ok_or_else(|| DomainError::NotFound(format!("feedback id: {id}")))?;
        info!(post_id = post.id, "feedback updated");
        Ok(post)
    }

    /// Returns the removed post so the caller knows whose page to go back to.
    pub(crate) async fn delete_post(
        &self,
        identity: Option<&str>,
        id: i64,
    ) -> Result<Post, DomainError> {
        let post = self.post_for_edit(identity, id).await?;

        if !self.posts.delete_post(id).await? {
            return Err(DomainError::NotFound(format!("feedback id: {id}")));
        }
        info!(post_id = id, "feedback deleted");
        Ok(post)
    }
}

fn guard<'a>(
    identity: Option<&'a str>,
    owner: &str,
    action: &'static str,
) -> Result<&'a str, DomainError> {
    authorize_owner(identity, owner).inspect_err(|err| {
        if matches!(err, DomainError::Forbidden) {
            warn!(actor = identity.unwrap_or_default(), %owner, action, "forbidden");
        }
    })
}
