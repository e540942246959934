use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::TokenPair;
use chrono::Utc;
use tokio::time::Instant;

use crate::domain::user::models::Credentials;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Default bound on credential store work per operation.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(100);

/// Deadline shared by every credential store call of one operation.
///
/// Each call is raced against the same instant, and the call's future is
/// dropped on every exit path, whether it completed, failed or timed out.
struct StoreDeadline {
    at: Instant,
    budget: Duration,
}

impl StoreDeadline {
    fn start(budget: Duration) -> Self {
        Self {
            at: Instant::now() + budget,
            budget,
        }
    }

    async fn run<T, F>(&self, operation: &'static str, call: F) -> Result<T, UserError>
    where
        F: Future<Output = Result<T, UserError>>,
    {
        match tokio::time::timeout_at(self.at, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    operation,
                    timeout_secs = self.budget.as_secs(),
                    "Credential store call timed out"
                );
                Err(UserError::Timeout(self.budget.as_secs()))
            }
        }
    }
}

/// Domain service implementation for credential flows.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    store_timeout: Duration,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Credential store implementation
    /// * `authenticator` - Password and token coordinator
    /// * `store_timeout` - Bound on credential store work per operation
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            authenticator,
            store_timeout,
        }
    }

    /// Hash on the blocking pool.
    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| {
                tracing::error!(error = %e, "Password hashing failed");
                UserError::Hashing(e.to_string())
            })
    }

    /// Write the pair back, then return the token fields as re-read from the store.
    async fn persist_tokens(
        &self,
        deadline: &StoreDeadline,
        id: &UserId,
        tokens: &TokenPair,
    ) -> Result<TokenPair, UserError> {
        deadline
            .run(
                "update_tokens",
                self.repository.update_tokens(id, tokens, Utc::now()),
            )
            .await
            .map_err(|e| {
                tracing::error!(user_id = %id, error = %e, "Failed to persist issued tokens");
                match e {
                    UserError::NotFound(_) => UserError::DatabaseError(format!(
                        "user {} disappeared before its tokens were stored",
                        id
                    )),
                    other => other,
                }
            })?;

        let stored = deadline
            .run("find_by_id", self.repository.find_by_id(id))
            .await?
            .ok_or_else(|| {
                tracing::error!(user_id = %id, "User missing when re-reading stored tokens");
                UserError::DatabaseError(format!("user {} disappeared after token write-back", id))
            })?;

        match (stored.token, stored.refresh_token) {
            (Some(access_token), Some(refresh_token)) => Ok(TokenPair {
                access_token,
                refresh_token,
            }),
            _ => Err(UserError::DatabaseError(format!(
                "tokens for user {} were not persisted",
                id
            ))),
        }
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError> {
        let deadline = StoreDeadline::start(self.store_timeout);

        if deadline
            .run(
                "email_exists",
                self.repository.email_exists(command.email.as_str()),
            )
            .await?
        {
            tracing::warn!(email = %command.email, "Registration rejected: email already exists");
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self
            .hash_password(command.password.expose().to_string())
            .await?;

        let now = Utc::now();
        let user = User {
            id: UserId::new(),
            email: command.email,
            password_hash,
            first_name: command.first_name,
            last_name: command.last_name,
            role: command.role,
            token: None,
            refresh_token: None,
            created_at: now,
            updated_at: now,
        };

        let created_user = deadline
            .run("create", self.repository.create(user))
            .await?;

        tracing::info!(user_id = %created_user.id, role = %created_user.role, "User registered");

        Ok(created_user)
    }

    async fn login(&self, credentials: Credentials) -> Result<TokenPair, UserError> {
        let deadline = StoreDeadline::start(self.store_timeout);

        let found = deadline
            .run(
                "find_by_email",
                self.repository.find_by_email(&credentials.email),
            )
            .await?;

        let authenticator = Arc::clone(&self.authenticator);
        let account = found
            .as_ref()
            .map(|user| (user.password_hash.clone(), user.identity()));
        let password = credentials.password;

        // Unknown emails pay for a decoy verification too.
        let outcome = tokio::task::spawn_blocking(move || match account {
            Some((stored_hash, identity)) => {
                authenticator.authenticate(&password, &stored_hash, &identity)
            }
            None => Err(authenticator.reject_unknown_account(&password)),
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Authentication task failed: {}", e)))?;

        let (user, tokens) = match (found, outcome) {
            (Some(user), Ok(tokens)) => (user, tokens),
            (None, _) => {
                tracing::warn!("Login rejected: unknown email");
                return Err(UserError::InvalidCredentials);
            }
            (Some(user), Err(AuthenticationError::InvalidCredentials)) => {
                tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
                return Err(UserError::InvalidCredentials);
            }
            (Some(_), Err(AuthenticationError::JwtError(err))) => {
                tracing::error!(error = %err, "Token generation failed");
                return Err(UserError::TokenIssue(err.to_string()));
            }
        };

        let stored = self.persist_tokens(&deadline, &user.id, &tokens).await?;

        tracing::info!(user_id = %user.id, "User logged in");

        Ok(stored)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, UserError> {
        self.authenticator
            .validate_refresh_token(refresh_token)
            .map_err(|e| {
                tracing::warn!(reason = %e, "Refresh token rejected");
                UserError::InvalidRefreshToken
            })?;

        let deadline = StoreDeadline::start(self.store_timeout);

        let user = deadline
            .run(
                "find_by_refresh_token",
                self.repository.find_by_refresh_token(refresh_token),
            )
            .await?
            .ok_or_else(|| {
                tracing::warn!("Refresh token is not the one on record");
                UserError::InvalidRefreshToken
            })?;

        let tokens = self
            .authenticator
            .issue_tokens(&user.identity())
            .map_err(|e| {
                tracing::error!(error = %e, "Token generation failed");
                UserError::TokenIssue(e.to_string())
            })?;

        let stored = self.persist_tokens(&deadline, &user.id, &tokens).await?;

        tracing::info!(user_id = %user.id, "Tokens renewed");

        Ok(stored)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        let deadline = StoreDeadline::start(self.store_timeout);

        deadline
            .run("find_by_id", self.repository.find_by_id(id))
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self) -> Result<Vec<User>, UserError> {
        let deadline = StoreDeadline::start(self.store_timeout);

        deadline
            .run("list_all", self.repository.list_all())
            .await
    }
}
