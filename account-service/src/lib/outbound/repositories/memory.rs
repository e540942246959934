use std::collections::HashMap;

use async_trait::async_trait;
use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

/// In-memory credential store.
///
/// Intended for tests/dev. Every write holds the lock for the whole
/// check-and-set, so email uniqueness and token upserts are atomic.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<UserId, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == user.email) {
            return Err(UserError::EmailAlreadyExists(user.email.to_string()));
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email.as_str() == email)
            .cloned())
    }

    async fn find_by_refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<Option<User>, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.refresh_token.as_deref() == Some(refresh_token))
            .cloned())
    }

    async fn email_exists(&self, email: &str) -> Result<bool, UserError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|u| u.email.as_str() == email))
    }

    async fn list_all(&self) -> Result<Vec<User>, UserError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn update_tokens(
        &self,
        id: &UserId,
        tokens: &TokenPair,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UserError> {
        let mut users = self.users.write().await;
        let user = users
            .get_mut(id)
            .ok_or_else(|| UserError::NotFound(id.to_string()))?;

        user.token = Some(tokens.access_token.clone());
        user.refresh_token = Some(tokens.refresh_token.clone());
        user.updated_at = updated_at;
        Ok(())
    }
}
