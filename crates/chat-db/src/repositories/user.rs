//! PostgreSQL implementation of UserDirectory

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use chat_core::entities::{User, UserCredentials};
use chat_core::error::DomainError;
use chat_core::traits::{RepoResult, UserDirectory};
use chat_core::value_objects::UserId;

use crate::models::UserModel;

use super::error::{map_db_error, map_unique_violation};

const USER_COLUMNS: &str =
    "id, username, display_name, password_hash, avatar_url, online, last_seen, created_at";

/// PostgreSQL implementation of UserDirectory
#[derive(Clone)]
pub struct PgUserDirectory {
    pool: PgPool,
}

impl PgUserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_by_username(&self, username: &str) -> RepoResult<Option<UserModel>> {
        sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(User::normalize_username(username))
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)
    }
}

#[async_trait]
impl UserDirectory for PgUserDirectory {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        let result = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(User::from))
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn find_by_ids(&self, ids: &[UserId]) -> RepoResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = ids.iter().map(|id| id.into_inner()).collect();
        let results = sqlx::query_as::<_, UserModel>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ANY($1)"
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(User::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self.fetch_by_username(username).await?.map(User::from))
    }

    #[instrument(skip(self))]
    async fn find_credentials(&self, username: &str) -> RepoResult<Option<UserCredentials>> {
        Ok(self
            .fetch_by_username(username)
            .await?
            .map(UserCredentials::from))
    }

    #[instrument(skip(self, user, password_hash), fields(user_id = %user.id, username = %user.username))]
    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO users (id, username, display_name, password_hash, avatar_url, online, last_seen, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ",
        )
        .bind(user.id.into_inner())
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(password_hash)
        .bind(&user.avatar_url)
        .bind(user.online)
        .bind(user.last_seen)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::UsernameTaken))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_presence(
        &self,
        id: UserId,
        online: bool,
        last_seen: DateTime<Utc>,
    ) -> RepoResult<()> {
        let result = sqlx::query("UPDATE users SET online = $2, last_seen = $3 WHERE id = $1")
            .bind(id.into_inner())
            .bind(online)
            .bind(last_seen)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::UserNotFound(id));
        }

        Ok(())
    }
}
