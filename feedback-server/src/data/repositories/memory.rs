//! In-process store used when no `DATABASE_URL` is configured, and by tests.
//!
//! Users and feedback live behind one lock so that every mutation, including
//! the cascading user delete, is applied atomically.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::post::Post;
use crate::domain::user::User;

#[derive(Debug, Default)]
struct MemoryState {
    users: HashMap<String, UserCredentials>,
    posts: BTreeMap<i64, Post>,
    last_post_id: i64,
    last_session_epoch: i64,
}

impl MemoryState {
    fn next_session_epoch(&mut self) -> i64 {
        self.last_session_epoch += 1;
        self.last_session_epoch
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, DomainError> {
        self.state
            .read()
            .map_err(|_| DomainError::Unexpected("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, DomainError> {
        self.state
            .write()
            .map_err(|_| DomainError::Unexpected("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, input: NewUser) -> Result<UserCredentials, DomainError> {
        let user = User::new(
            input.username,
            input.email,
            input.first_name,
            input.last_name,
        )?;

        let mut state = self.write()?;
        if state.users.contains_key(&user.username) {
            return Err(DomainError::AlreadyExists("username"));
        }
        if state.users.values().any(|c| c.user.email == user.email) {
            return Err(DomainError::AlreadyExists("email"));
        }

        let creds = UserCredentials {
            user,
            password_hash: input.password_hash,
            session_epoch: state.next_session_epoch(),
        };
        state.users.insert(creds.user.username.clone(), creds.clone());
        Ok(creds)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        Ok(self.read()?.users.get(username).cloned())
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, DomainError> {
        Ok(self.read()?.users.get(username).map(|c| c.user.clone()))
    }

    async fn session_epoch(&self, username: &str) -> Result<Option<i64>, DomainError> {
        Ok(self.read()?.users.get(username).map(|c| c.session_epoch))
    }

    async fn rotate_session_epoch(&self, username: &str) -> Result<Option<i64>, DomainError> {
        let mut state = self.write()?;
        if !state.users.contains_key(username) {
            return Ok(None);
        }
        let epoch = state.next_session_epoch();
        Ok(state.users.get_mut(username).map(|creds| {
            creds.session_epoch = epoch;
            epoch
        }))
    }

    async fn delete_user(&self, username: &str) -> Result<bool, DomainError> {
        let mut state = self.write()?;
        if state.users.remove(username).is_none() {
            return Ok(false);
        }
        state.posts.retain(|_, post| post.owner_username != username);
        Ok(true)
    }
}

#[async_trait]
impl PostRepository for MemoryStore {
    async fn create_post(&self, input: NewPost) -> Result<Post, DomainError> {
        let mut state = self.write()?;
        if !state.users.contains_key(&input.owner_username) {
            return Err(DomainError::NotFound("user".to_string()));
        }

        let id = state.last_post_id + 1;
        let post = Post::new(id, input.title, input.content, input.owner_username)?;
        state.last_post_id = id;
        state.posts.insert(id, post.clone());
        Ok(post)
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.read()?.posts.get(&id).cloned())
    }

    async fn update_post(&self, id: i64, patch: PostPatch) -> Result<Option<Post>, DomainError> {
        let mut state = self.write()?;
        let Some(post) = state.posts.get_mut(&id) else {
            return Ok(None);
        };
        post.title = patch.title;
        post.content = patch.content;
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, id: i64) -> Result<bool, DomainError> {
        Ok(self.write()?.posts.remove(&id).is_some())
    }

    async fn list_recent_posts(&self, limit: u32) -> Result<Vec<Post>, DomainError> {
        let state = self.read()?;
        Ok(state
            .posts
            .values()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_posts_by_owner(&self, owner_username: &str) -> Result<Vec<Post>, DomainError> {
        let state = self.read()?;
        Ok(state
            .posts
            .values()
            .rev()
            .filter(|post| post.owner_username == owner_username)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::data::post_repository::{NewPost, PostPatch, PostRepository};
    use crate::data::user_repository::{NewUser, UserRepository};
    use crate::domain::error::DomainError;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: format!("hash-of-{username}"),
        }
    }

    fn new_post(owner: &str, title: &str) -> NewPost {
        NewPost {
            title: title.to_string(),
            content: format!("{title} content"),
            owner_username: owner.to_string(),
        }
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected_and_first_row_kept() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("joebiden", "joe.biden@test.com"))
            .await
            .expect("first insert must succeed");

        let err = store
            .create_user(new_user("joebiden", "other@test.com"))
            .await
            .expect_err("duplicate must fail");
        assert!(matches!(err, DomainError::AlreadyExists("username")));

        let creds = store
            .find_by_username("joebiden")
            .await
            .expect("lookup must succeed")
            .expect("first user must still exist");
        assert_eq!(creds.user.email, "joe.biden@test.com");
        assert_eq!(creds.password_hash, "hash-of-joebiden");
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("joebiden", "shared@test.com"))
            .await
            .expect("first insert must succeed");

        let err = store
            .create_user(new_user("georgebush", "shared@test.com"))
            .await
            .expect_err("duplicate email must fail");
        assert!(matches!(err, DomainError::AlreadyExists("email")));
        assert!(
            store
                .get_user("georgebush")
                .await
                .expect("lookup must succeed")
                .is_none()
        );
    }

    #[tokio::test]
    async fn post_for_unknown_owner_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .create_post(new_post("ghost", "Title"))
            .await
            .expect_err("owner must exist");
        assert!(matches!(err, DomainError::NotFound(_)));
    }

    #[tokio::test]
    async fn recent_posts_are_limited_and_newest_first() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("joebiden", "joe.biden@test.com"))
            .await
            .expect("user insert must succeed");
        for i in 0..15 {
            store
                .create_post(new_post("joebiden", &format!("Title {i}")))
                .await
                .expect("post insert must succeed");
        }

        let recent = store.list_recent_posts(10).await.expect("list must succeed");
        assert_eq!(recent.len(), 10);
        assert!(recent.windows(2).all(|w| w[0].id > w[1].id));
        assert_eq!(recent[0].title, "Title 14");

        let few = store.list_recent_posts(3).await.expect("list must succeed");
        assert_eq!(few.len(), 3);
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_posts() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("joebiden", "joe.biden@test.com"))
            .await
            .expect("user insert must succeed");
        store
            .create_user(new_user("georgebush", "george.bush@test.com"))
            .await
            .expect("user insert must succeed");
        store
            .create_post(new_post("joebiden", "Joe 1"))
            .await
            .expect("post insert must succeed");
        let kept = store
            .create_post(new_post("georgebush", "George 1"))
            .await
            .expect("post insert must succeed");
        store
            .create_post(new_post("joebiden", "Joe 2"))
            .await
            .expect("post insert must succeed");

        assert!(store.delete_user("joebiden").await.expect("delete must succeed"));

        let recent = store.list_recent_posts(10).await.expect("list must succeed");
        assert_eq!(recent, vec![kept]);
        assert!(
            store
                .list_posts_by_owner("joebiden")
                .await
                .expect("list must succeed")
                .is_empty()
        );
        assert!(!store.delete_user("joebiden").await.expect("delete must succeed"));
    }

    #[tokio::test]
    async fn update_and_delete_missing_post_report_absence() {
        let store = MemoryStore::new();
        let patch = PostPatch {
            title: "t".to_string(),
            content: "c".to_string(),
        };
        assert!(store.update_post(99, patch).await.expect("update must run").is_none());
        assert!(!store.delete_post(99).await.expect("delete must run"));
    }

    #[tokio::test]
    async fn session_epoch_rotates_and_is_never_reused() {
        let store = MemoryStore::new();
        let first = store
            .create_user(new_user("joebiden", "joe.biden@test.com"))
            .await
            .expect("user insert must succeed");

        let rotated = store
            .rotate_session_epoch("joebiden")
            .await
            .expect("rotate must run")
            .expect("user must exist");
        assert!(rotated > first.session_epoch);
        assert_eq!(
            store.session_epoch("joebiden").await.expect("lookup must run"),
            Some(rotated)
        );

        assert!(store.delete_user("joebiden").await.expect("delete must succeed"));
        assert_eq!(store.session_epoch("joebiden").await.expect("lookup must run"), None);
        assert_eq!(
            store
                .rotate_session_epoch("joebiden")
                .await
                .expect("rotate must run"),
            None
        );

        let again = store
            .create_user(new_user("joebiden", "joe.biden@test.com"))
            .await
            .expect("user insert must succeed");
        assert!(again.session_epoch > rotated);
    }

    #[tokio::test]
    async fn post_ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        store
            .create_user(new_user("joebiden", "joe.biden@test.com"))
            .await
            .expect("user insert must succeed");
        let first = store
            .create_post(new_post("joebiden", "One"))
            .await
            .expect("post insert must succeed");
        store.delete_post(first.id).await.expect("delete must succeed");

        let second = store
            .create_post(new_post("joebiden", "Two"))
            .await
            .expect("post insert must succeed");
        assert!(second.id > first.id);
    }
}
