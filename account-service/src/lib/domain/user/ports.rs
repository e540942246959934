use async_trait::async_trait;
use auth::TokenPair;
use chrono::DateTime;
use chrono::Utc;

use crate::domain::user::models::Credentials;
use crate::domain::user::models::RegisterUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for credential flow operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// # Arguments
    /// * `command` - Validated command containing email, password, names and role
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Hashing` - Password could not be hashed
    /// * `DatabaseError` / `Timeout` - Credential store failed
    async fn register(&self, command: RegisterUserCommand) -> Result<User, UserError>;

    /// Verify credentials, issue a token pair and persist it.
    ///
    /// # Returns
    /// The token pair read back from the credential store
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password (indistinguishable)
    /// * `TokenIssue` - Tokens could not be signed
    /// * `DatabaseError` / `Timeout` - Credential store failed, including during token write-back
    async fn login(&self, credentials: Credentials) -> Result<TokenPair, UserError>;

    /// Exchange a refresh token for a new token pair.
    ///
    /// # Errors
    /// * `InvalidRefreshToken` - Token rejected or not the one on record
    /// * `TokenIssue` - Tokens could not be signed
    /// * `DatabaseError` / `Timeout` - Credential store failed
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` / `Timeout` - Credential store failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve all users, newest first.
    ///
    /// # Errors
    /// * `DatabaseError` / `Timeout` - Credential store failed
    async fn list_users(&self) -> Result<Vec<User>, UserError>;
}

/// Credential store operations.
///
/// Implementations guarantee atomic reads and writes per record.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserError>;

    /// Retrieve the user whose current refresh token equals `refresh_token`.
    async fn find_by_refresh_token(&self, refresh_token: &str)
        -> Result<Option<User>, UserError>;

    /// Check whether a user with this email exists.
    async fn email_exists(&self, email: &str) -> Result<bool, UserError>;

    /// Retrieve all users, newest first.
    async fn list_all(&self) -> Result<Vec<User>, UserError>;

    /// Store the latest token pair for a user and stamp `updated_at`.
    ///
    /// Upsert semantics: the token sub-record is created when absent and
    /// overwritten otherwise.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_tokens(
        &self,
        id: &UserId,
        tokens: &TokenPair,
        updated_at: DateTime<Utc>,
    ) -> Result<(), UserError>;
}
