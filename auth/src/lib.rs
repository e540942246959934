//! Authentication and authorization library
//!
//! Provides the credential and token core used by the account service:
//! - Password hashing (Argon2id)
//! - Signed token encoding, issuance and validation (HS256 JWT)
//! - Role and ownership access checks
//! - Authentication coordination
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify(&hash, "my_password"));
//! ```
//!
//! ## Complete Authentication Flow
//! ```
//! use auth::{AccessPolicy, Authenticator, Identity, Role};
//!
//! let auth = Authenticator::new(b"secret_key_at_least_32_bytes_long!");
//!
//! // Register: hash password
//! let hash = auth.hash_password("password123").unwrap();
//!
//! // Login: verify and issue tokens
//! let identity = Identity {
//!     email: "alice@example.com".to_string(),
//!     first_name: "Alice".to_string(),
//!     last_name: "Liddell".to_string(),
//!     uid: "user123".to_string(),
//!     role: Role::User,
//! };
//! let pair = auth.authenticate("password123", &hash, &identity).unwrap();
//!
//! // Validate token and check access
//! let claims = auth.validate_access_token(&pair.access_token).unwrap();
//! assert!(AccessPolicy::require_owner_or_role(&claims.identity, "user123", Role::Admin).is_ok());
//! ```

pub mod authenticator;
pub mod jwt;
pub mod password;
pub mod policy;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use jwt::AccessClaims;
pub use jwt::Identity;
pub use jwt::JwtError;
pub use jwt::RefreshClaims;
pub use jwt::Role;
pub use jwt::TokenCodec;
pub use jwt::TokenIssuer;
pub use jwt::TokenLifetimes;
pub use jwt::TokenPair;
pub use jwt::TokenValidator;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::WorkFactor;
pub use policy::AccessPolicy;
pub use policy::AuthzError;
