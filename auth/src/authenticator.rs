use std::sync::Arc;
use std::sync::OnceLock;

use crate::jwt::AccessClaims;
use crate::jwt::Identity;
use crate::jwt::JwtError;
use crate::jwt::RefreshClaims;
use crate::jwt::TokenCodec;
use crate::jwt::TokenIssuer;
use crate::jwt::TokenLifetimes;
use crate::jwt::TokenPair;
use crate::jwt::TokenValidator;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token handling.
///
/// Holds the signing secret (inside its codec) for the life of the process.
/// Shared behind an `Arc`; every operation takes `&self`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    issuer: TokenIssuer,
    validator: TokenValidator,
    decoy_hash: OnceLock<Option<String>>,
}

/// Authentication operation errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("JWT error: {0}")]
    JwtError(#[from] JwtError),
}

impl Authenticator {
    /// Create an authenticator with default token lifetimes and hashing cost.
    ///
    /// # Arguments
    /// * `jwt_secret` - Secret key for token signing
    pub fn new(jwt_secret: &[u8]) -> Self {
        Self::with_settings(jwt_secret, TokenLifetimes::default(), PasswordHasher::new())
    }

    /// Create an authenticator with explicit lifetimes and hasher.
    pub fn with_settings(
        jwt_secret: &[u8],
        lifetimes: TokenLifetimes,
        password_hasher: PasswordHasher,
    ) -> Self {
        let codec = Arc::new(TokenCodec::new(jwt_secret));

        Self {
            password_hasher,
            issuer: TokenIssuer::new(Arc::clone(&codec), lifetimes),
            validator: TokenValidator::new(codec),
            decoy_hash: OnceLock::new(),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify credentials and issue a token pair.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `identity` - Identity to encode into the access token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `JwtError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        identity: &Identity,
    ) -> Result<TokenPair, AuthenticationError> {
        if !self.password_hasher.verify(stored_hash, password) {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(self.issuer.issue_pair(identity)?)
    }

    /// Reject a login for an account that does not exist.
    ///
    /// Runs a full verification against a decoy hash made with the same work
    /// factor, so the rejection costs as much as a wrong password does.
    pub fn reject_unknown_account(&self, password: &str) -> AuthenticationError {
        let decoy = self.decoy_hash.get_or_init(|| {
            self.password_hasher
                .hash("decoy-password-for-unknown-accounts")
                .map_err(|e| tracing::error!(error = %e, "Failed to build decoy hash"))
                .ok()
        });

        if let Some(hash) = decoy {
            let _ = self.password_hasher.verify(hash, password);
        }

        AuthenticationError::InvalidCredentials
    }

    /// Issue a token pair without password verification.
    ///
    /// Used by the renewal flow, where the caller already proved possession
    /// of a valid refresh token.
    pub fn issue_tokens(&self, identity: &Identity) -> Result<TokenPair, JwtError> {
        self.issuer.issue_pair(identity)
    }

    /// Validate an access token and return its claims.
    pub fn validate_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        self.validator.validate_access(token)
    }

    /// Validate a refresh token and return its claims.
    pub fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        self.validator.validate_refresh(token)
    }
}
