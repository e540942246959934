use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Account role carried in access tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "USER" => Ok(Role::User),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Identity of an authenticated account, as mirrored into access tokens.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub uid: String,
    #[serde(rename = "user_type")]
    pub role: Role,
}

/// Claims of a short-lived access token.
///
/// Identity fields are flattened next to the registered `exp`/`iat` claims.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    #[serde(flatten)]
    pub identity: Identity,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl AccessClaims {
    /// Build access claims expiring `lifetime` after `issued_at`.
    ///
    /// # Errors
    /// * `EncodingFailed` - The expiry is outside the representable range
    pub fn new(
        identity: Identity,
        issued_at: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<Self, JwtError> {
        Ok(Self {
            identity,
            exp: expiry(issued_at, lifetime)?,
            iat: issued_at.timestamp(),
        })
    }
}

/// Claims of a long-lived refresh token.
///
/// Carries no identity fields. `jti` keeps two refresh tokens minted in the
/// same second distinct, so a stored refresh token resolves to one account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RefreshClaims {
    /// Token identifier
    pub jti: String,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issued at (Unix timestamp)
    pub iat: i64,
}

impl RefreshClaims {
    pub fn new(issued_at: DateTime<Utc>, lifetime: Duration) -> Result<Self, JwtError> {
        Ok(Self {
            jti: uuid::Uuid::new_v4().to_string(),
            exp: expiry(issued_at, lifetime)?,
            iat: issued_at.timestamp(),
        })
    }
}

fn expiry(issued_at: DateTime<Utc>, lifetime: Duration) -> Result<i64, JwtError> {
    issued_at
        .checked_add_signed(lifetime)
        .map(|expires_at| expires_at.timestamp())
        .ok_or_else(|| JwtError::EncodingFailed("token expiry is out of range".to_string()))
}

/// Claims that carry an expiry instant the validator can check.
pub trait Expiring {
    /// Expiration time (Unix timestamp)
    fn expires_at(&self) -> i64;

    /// A token is expired once its expiry is at or before `now`.
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at() <= now.timestamp()
    }
}

impl Expiring for AccessClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

impl Expiring for RefreshClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn identity() -> Identity {
        Identity {
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
            uid: "5a7c7f0e-3c55-4d3e-9b0e-5a1b5d7c9e11".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn test_access_claims_lifetime() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        let claims = AccessClaims::new(identity(), now, Duration::hours(24)).unwrap();

        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.exp - claims.iat, 24 * 60 * 60);
    }

    #[test]
    fn test_refresh_claims_are_unique() {
        let now = Utc::now();
        let first = RefreshClaims::new(now, Duration::hours(168)).unwrap();
        let second = RefreshClaims::new(now, Duration::hours(168)).unwrap();

        assert_eq!(first.exp, second.exp);
        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_out_of_range_expiry_is_an_error() {
        let now = Utc::now();
        let lifetime = Duration::try_days(365 * 300_000).unwrap();

        assert!(matches!(
            AccessClaims::new(identity(), now, lifetime),
            Err(JwtError::EncodingFailed(_))
        ));
        assert!(matches!(
            RefreshClaims::new(now, lifetime),
            Err(JwtError::EncodingFailed(_))
        ));
    }

    #[test]
    fn test_is_expired_boundary() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut claims = AccessClaims::new(identity(), now, Duration::hours(1)).unwrap();

        claims.exp = now.timestamp() + 1;
        assert!(!claims.is_expired(now));

        claims.exp = now.timestamp();
        assert!(claims.is_expired(now)); // Exactly at expiration

        claims.exp = now.timestamp() - 1;
        assert!(claims.is_expired(now));
    }

    #[test]
    fn test_access_claims_wire_shape() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let claims = AccessClaims::new(identity(), now, Duration::hours(24)).unwrap();
        let value = serde_json::to_value(&claims).unwrap();

        assert_eq!(value["email"], "alice@example.com");
        assert_eq!(value["first_name"], "Alice");
        assert_eq!(value["uid"], "5a7c7f0e-3c55-4d3e-9b0e-5a1b5d7c9e11");
        assert_eq!(value["user_type"], "USER");
        assert_eq!(value["exp"], now.timestamp() + 24 * 60 * 60);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!("ADMIN".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("USER".parse::<Role>(), Ok(Role::User));
        assert!("admin".parse::<Role>().is_err());
        assert_eq!(Role::Admin.to_string(), "ADMIN");
    }
}
