use std::sync::Arc;

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        Error as PasswordHashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
        rand_core::OsRng,
    },
};
use tracing::{debug, info, warn};

use crate::data::user_repository::{NewUser, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::{LoginRequest, RegisterRequest, User};
use crate::infrastructure::session::SessionAuthenticator;

#[derive(Debug, Clone)]
pub(crate) struct AuthResult {
    pub(crate) user: User,
    pub(crate) session_token: String,
}

pub(crate) struct AuthService {
    repo: Arc<dyn UserRepository>,
    sessions: Arc<SessionAuthenticator>,
}

impl AuthService {
    // verified against when the username is unknown so both paths cost one Argon2 run
    const DUMMY_PASSWORD_HASH: &'static str = "$argon2id$v=19$m=19456,t=2,p=1$MDEyMzQ1Njc4OWFiY2RlZg$gwN6hT1sNdk9kI95f7n2Gl3fL0qRmBf2Ffkj2r90/0M";

    pub(crate) fn new(repo: Arc<dyn UserRepository>, sessions: Arc<SessionAuthenticator>) -> Self {
        Self { repo, sessions }
    }

    pub(crate) async fn register(&self, req: RegisterRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let password_hash = self.hash_password(&req.password)?;

        let new_user = Self::into_new_user(req, password_hash);
        let creds = self.repo.create_user(new_user).await?;
        info!(username = %creds.user.username, "user registered");

        let session_token = self.start_session(&creds.user, creds.session_epoch)?;
        Ok(AuthResult {
            user: creds.user,
            session_token,
        })
    }

    /// Unknown usernames and wrong passwords both end in `InvalidCredentials`.
    pub(crate) async fn login(&self, req: LoginRequest) -> Result<AuthResult, DomainError> {
        let req = req.validate()?;

        let user_creds = match self.repo.find_by_username(&req.username).await? {
            Some(user_creds) => user_creds,
            None => {
                match self.verify_password(&req.password, Self::DUMMY_PASSWORD_HASH) {
                    Ok(()) | Err(DomainError::InvalidCredentials) => {}
                    Err(err) => return Err(err),
                }
                warn!("login failed");
                return Err(DomainError::InvalidCredentials);
            }
        };

        if let Err(err) = self.verify_password(&req.password, &user_creds.password_hash) {
            warn!("login failed");
            return Err(err);
        }
        info!(username = %user_creds.user.username, "user logged in");

        let session_token = self.start_session(&user_creds.user, user_creds.session_epoch)?;
        Ok(AuthResult {
            user: user_creds.user,
            session_token,
        })
    }

    /// Username behind a session token, or `None` when the token is invalid,
    /// its account is gone, or the session was ended since it was issued.
    pub(crate) async fn resolve_session(
        &self,
        token: Option<&str>,
    ) -> Result<Option<String>, DomainError> {
        let Some(claims) = self.sessions.resolve(token) else {
            return Ok(None);
        };

        let current = self.repo.session_epoch(&claims.sub).await?;
        if current != Some(claims.epoch) {
            debug!(username = %claims.sub, "stale session token");
            return Ok(None);
        }
        Ok(Some(claims.sub))
    }

    /// Invalidates every token issued to `username` so far.
    pub(crate) async fn end_session(&self, username: &str) -> Result<(), DomainError> {
        if self.repo.rotate_session_epoch(username).await?.is_none() {
            return Err(DomainError::NotFound(format!("user: {username}")));
        }
        info!(%username, "session ended");
        Ok(())
    }

    pub(crate) fn hash_password(&self, raw_password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Self::argon2()?
            .hash_password(raw_password.as_bytes(), &salt)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(password_hash.to_string())
    }

    pub(crate) fn verify_password(
        &self,
        raw_password: &str,
        password_hash: &str,
    ) -> Result<(), DomainError> {
        let parsed_hash = PasswordHash::new(password_hash)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Self::argon2()?
            .verify_password(raw_password.as_bytes(), &parsed_hash)
            .map_err(|err| match err {
                PasswordHashError::Password => DomainError::InvalidCredentials,
                _ => DomainError::Unexpected(err.to_string()),
            })
    }

    fn start_session(&self, user: &User, epoch: i64) -> Result<String, DomainError> {
        self.sessions
            .start_session(&user.username, epoch)
            .map_err(|err| DomainError::Unexpected(err.to_string()))
    }

    fn into_new_user(req: RegisterRequest, password_hash: String) -> NewUser {
        NewUser {
            username: req.username,
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
        }
    }

    fn argon2() -> Result<Argon2<'static>, DomainError> {
        let params = Params::new(19 * 1024, 2, 1, None)
            .map_err(|err| DomainError::Unexpected(err.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::AuthService;
    use crate::data::repositories::memory::MemoryStore;
    use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
    use crate::domain::error::DomainError;
    use crate::domain::user::{LoginRequest, RegisterRequest, User};
    use crate::infrastructure::session::SessionAuthenticator;

    #[derive(Clone, Default)]
    struct RecordingUserRepo {
        created_input: Arc<Mutex<Option<NewUser>>>,
    }

    #[async_trait]
    impl UserRepository for RecordingUserRepo {
        async fn create_user(&self, input: NewUser) -> Result<UserCredentials, DomainError> {
            let user = User::new(
                input.username.clone(),
                input.email.clone(),
                input.first_name.clone(),
                input.last_name.clone(),
            )?;
            let creds = UserCredentials {
                user,
                password_hash: input.password_hash.clone(),
                session_epoch: 1,
            };
            *self
                .created_input
                .lock()
                .expect("created input mutex poisoned") = Some(input);
            Ok(creds)
        }

        async fn find_by_username(
            &self,
            _username: &str,
        ) -> Result<Option<UserCredentials>, DomainError> {
            Ok(None)
        }

        async fn get_user(&self, _username: &str) -> Result<Option<User>, DomainError> {
            Ok(None)
        }

        async fn session_epoch(&self, username: &str) -> Result<Option<i64>, DomainError> {
            let created = self
                .created_input
                .lock()
                .expect("created input mutex poisoned");
            Ok(created
                .as_ref()
                .filter(|input| input.username == username)
                .map(|_| 1))
        }

        async fn rotate_session_epoch(&self, _username: &str) -> Result<Option<i64>, DomainError> {
            Ok(None)
        }

        async fn delete_user(&self, _username: &str) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    fn sessions() -> Arc<SessionAuthenticator> {
        Arc::new(SessionAuthenticator::new(
            "0123456789abcdef0123456789abcdef",
            3600,
        ))
    }

    fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: email.to_string(),
            first_name: "Joe".to_string(),
            last_name: "Biden".to_string(),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn register_hashes_password_and_starts_session() {
        let repo = RecordingUserRepo::default();
        let sessions = sessions();
        let service = AuthService::new(Arc::new(repo.clone()), sessions.clone());

        let result = service
            .register(register_request(
                "  joebiden  ",
                "  Joe.Biden@TEST.com ",
                "password123",
            ))
            .await
            .expect("register must succeed");

        assert_eq!(result.user.username, "joebiden");
        assert_eq!(
            service
                .resolve_session(Some(&result.session_token))
                .await
                .expect("resolve must run")
                .as_deref(),
            Some("joebiden")
        );

        let created = repo
            .created_input
            .lock()
            .expect("created input mutex poisoned")
            .take()
            .expect("create_user must be called");
        assert_eq!(created.email, "joe.biden@test.com");
        assert_ne!(created.password_hash, "password123");
        assert!(created.password_hash.starts_with("$argon2id$"));
        service
            .verify_password("password123", &created.password_hash)
            .expect("stored hash must verify");
    }

    #[tokio::test]
    async fn register_rejects_invalid_input_before_hashing() {
        let repo = RecordingUserRepo::default();
        let service = AuthService::new(Arc::new(repo.clone()), sessions());

        let err = service
            .register(register_request("joebiden", "not-an-email", "password123"))
            .await
            .expect_err("register must fail");
        assert!(matches!(err, DomainError::Validation { field: "email", .. }));
        assert!(
            repo.created_input
                .lock()
                .expect("created input mutex poisoned")
                .is_none()
        );
    }

    #[tokio::test]
    async fn duplicate_username_fails_and_keeps_first_user() {
        let store = MemoryStore::new();
        let service = AuthService::new(Arc::new(store.clone()), sessions());

        service
            .register(register_request("joebiden", "joe.biden@test.com", "password123"))
            .await
            .expect("first register must succeed");
        let err = service
            .register(register_request("joebiden", "other@test.com", "123password"))
            .await
            .expect_err("duplicate must fail");
        assert!(matches!(err, DomainError::AlreadyExists("username")));

        // the first account still logs in with its original password
        service
            .login(login_request("joebiden", "password123"))
            .await
            .expect("first user must be untouched");
        let creds = store
            .find_by_username("joebiden")
            .await
            .expect("lookup must succeed")
            .expect("user must exist");
        assert_eq!(creds.user.email, "joe.biden@test.com");
    }

    #[tokio::test]
    async fn login_fails_uniformly_for_unknown_user_and_wrong_password() {
        let store = MemoryStore::new();
        let service = AuthService::new(Arc::new(store), sessions());
        service
            .register(register_request("joebiden", "joe.biden@test.com", "password123"))
            .await
            .expect("register must succeed");

        let unknown = service
            .login(login_request("georgebush", "password123"))
            .await
            .expect_err("unknown user must fail");
        let wrong = service
            .login(login_request("joebiden", "wrong-password"))
            .await
            .expect_err("wrong password must fail");

        assert!(matches!(unknown, DomainError::InvalidCredentials));
        assert!(matches!(wrong, DomainError::InvalidCredentials));
        assert_eq!(unknown.to_string(), wrong.to_string());
    }

    #[tokio::test]
    async fn login_returns_session_for_valid_credentials() {
        let store = MemoryStore::new();
        let sessions = sessions();
        let service = AuthService::new(Arc::new(store), sessions.clone());
        service
            .register(register_request("joebiden", "joe.biden@test.com", "password123"))
            .await
            .expect("register must succeed");

        let result = service
            .login(login_request(" joebiden ", "password123"))
            .await
            .expect("login must succeed");

        assert_eq!(result.user.username, "joebiden");
        let claims = sessions
            .resolve(Some(&result.session_token))
            .expect("token must verify");
        assert_eq!(claims.sub, "joebiden");
        assert_eq!(
            service
                .resolve_session(Some(&result.session_token))
                .await
                .expect("resolve must run")
                .as_deref(),
            Some("joebiden")
        );
    }

    #[tokio::test]
    async fn ended_session_token_no_longer_resolves() {
        let store = MemoryStore::new();
        let service = AuthService::new(Arc::new(store), sessions());
        let first = service
            .register(register_request("joebiden", "joe.biden@test.com", "password123"))
            .await
            .expect("register must succeed");

        service
            .end_session("joebiden")
            .await
            .expect("end session must succeed");
        assert_eq!(
            service
                .resolve_session(Some(&first.session_token))
                .await
                .expect("resolve must run"),
            None
        );

        let second = service
            .login(login_request("joebiden", "password123"))
            .await
            .expect("login must succeed");
        assert_eq!(
            service
                .resolve_session(Some(&second.session_token))
                .await
                .expect("resolve must run")
                .as_deref(),
            Some("joebiden")
        );
    }

    #[tokio::test]
    async fn token_of_deleted_account_does_not_carry_over_to_new_owner() {
        let store = MemoryStore::new();
        let service = AuthService::new(Arc::new(store.clone()), sessions());
        let old = service
            .register(register_request("joebiden", "joe.biden@test.com", "password123"))
            .await
            .expect("register must succeed");

        assert!(store.delete_user("joebiden").await.expect("delete must succeed"));
        assert_eq!(
            service
                .resolve_session(Some(&old.session_token))
                .await
                .expect("resolve must run"),
            None
        );

        service
            .register(register_request("joebiden", "someone@else.com", "different-pass"))
            .await
            .expect("name is free again");
        assert_eq!(
            service
                .resolve_session(Some(&old.session_token))
                .await
                .expect("resolve must run"),
            None
        );
    }
}
