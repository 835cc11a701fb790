use async_trait::async_trait;
use sqlx::PgPool;

use crate::data::user_repository::{NewUser, UserCredentials, UserRepository};
use crate::domain::error::DomainError;
use crate::domain::user::User;

#[derive(Debug, Clone)]
pub(crate) struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub(crate) fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    username: String,
    email: String,
    first_name: String,
    last_name: String,
}

#[derive(sqlx::FromRow)]
struct UserCredentialsRow {
    username: String,
    email: String,
    first_name: String,
    last_name: String,
    password_hash: String,
    session_epoch: i64,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, input: NewUser) -> Result<UserCredentials, DomainError> {
        let row = sqlx::query_as::<_, UserCredentialsRow>(
            r#"
            INSERT INTO users (username, password_hash, email, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING username, email, first_name, last_name, password_hash, session_epoch
            "#,
        )
        .bind(&input.username)
        .bind(&input.password_hash)
        .bind(&input.email)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .fetch_one(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        map_row_to_credentials(row)
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, DomainError> {
        let row = sqlx::query_as::<_, UserCredentialsRow>(
            r#"
            SELECT
            username,
            email,
            first_name,
            last_name,
            password_hash,
            session_epoch
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        row.map(map_row_to_credentials).transpose()
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>, DomainError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT username, email, first_name, last_name
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)?;

        row.map(map_row_to_user).transpose()
    }

    async fn session_epoch(&self, username: &str) -> Result<Option<i64>, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT session_epoch
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)
    }

    async fn rotate_session_epoch(&self, username: &str) -> Result<Option<i64>, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            UPDATE users
            SET session_epoch = nextval('users_session_epoch_seq')
            WHERE username = $1
            RETURNING session_epoch
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_user_db_error)
    }

    async fn delete_user(&self, username: &str) -> Result<bool, DomainError> {
        let mut tx = self.pool.begin().await.map_err(map_user_db_error)?;

        // feedback first: the cascade must not depend on the FK definition
        sqlx::query(
            r#"
            DELETE FROM feedback
            WHERE owner_username = $1
            "#,
        )
        .bind(username)
        .execute(&mut *tx)
        .await
        .map_err(map_user_db_error)?;

        let result = sqlx::query(
            r#"
            DELETE FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .execute(&mut *tx)
        .await
        .map_err(map_user_db_error)?;

        tx.commit().await.map_err(map_user_db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

fn map_row_to_user(row: UserRow) -> Result<User, DomainError> {
    User::new(row.username, row.email, row.first_name, row.last_name)
        .map_err(|err| DomainError::Unexpected(err.to_string()))
}

fn map_row_to_credentials(row: UserCredentialsRow) -> Result<UserCredentials, DomainError> {
    let user = User::new(row.username, row.email, row.first_name, row.last_name)
        .map_err(|err| DomainError::Unexpected(err.to_string()))?;

    Ok(UserCredentials {
        user,
        password_hash: row.password_hash,
        session_epoch: row.session_epoch,
    })
}

fn map_user_db_error(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db_err) = &err
        && db_err.code().as_deref() == Some("23505")
    {
        let resource = match db_err.constraint() {
            Some("users_pkey") => "username",
            Some("users_email_key") => "email",
            _ => "user",
        };
        return DomainError::AlreadyExists(resource);
    }
    DomainError::Unexpected(err.to_string())
}
