use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use chat_core::entities::{User, UserCredentials};
use chat_core::error::DomainError;
use chat_core::traits::{RepoResult, UserDirectory};
use chat_core::value_objects::UserId;

#[derive(Default)]
struct Inner {
    users: HashMap<UserId, UserCredentials>,
    by_username: HashMap<String, UserId>,
}

/// User directory held in memory
#[derive(Default)]
pub struct MemoryUserDirectory {
    inner: RwLock<Inner>,
}

impl MemoryUserDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_id(&self, id: UserId) -> RepoResult<Option<User>> {
        Ok(self.inner.read().users.get(&id).map(|c| c.user.clone()))
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> RepoResult<Vec<User>> {
        let inner = self.inner.read();
        Ok(ids
            .iter()
            .filter_map(|id| inner.users.get(id))
            .map(|c| c.user.clone())
            .collect())
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        Ok(self
            .find_credentials(username)
            .await?
            .map(|c| c.user))
    }

    async fn find_credentials(&self, username: &str) -> RepoResult<Option<UserCredentials>> {
        let inner = self.inner.read();
        Ok(inner
            .by_username
            .get(&User::normalize_username(username))
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn create(&self, user: &User, password_hash: &str) -> RepoResult<()> {
        let mut inner = self.inner.write();
        if inner.by_username.contains_key(&user.username) || inner.users.contains_key(&user.id) {
            return Err(DomainError::UsernameTaken);
        }

        inner.by_username.insert(user.username.clone(), user.id);
        inner.users.insert(
            user.id,
            UserCredentials {
                user: user.clone(),
                password_hash: password_hash.to_string(),
            },
        );
        Ok(())
    }

    async fn set_presence(
        &self,
        id: UserId,
        online: bool,
        last_seen: DateTime<Utc>,
    ) -> RepoResult<()> {
        let mut inner = self.inner.write();
        let entry = inner
            .users
            .get_mut(&id)
            .ok_or(DomainError::UserNotFound(id))?;

        entry.user.online = online;
        entry.user.last_seen = Some(last_seen);
        Ok(())
    }
}
