use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;

use super::claims::AccessClaims;
use super::claims::Expiring;
use super::claims::RefreshClaims;
use super::codec::TokenCodec;
use super::errors::JwtError;

/// Verifies received tokens.
///
/// Outcomes: `Ok(claims)` when valid, otherwise one of `Malformed`,
/// `SignatureInvalid` or `Expired`. Stateless apart from the shared codec.
pub struct TokenValidator {
    codec: Arc<TokenCodec>,
}

impl TokenValidator {
    pub fn new(codec: Arc<TokenCodec>) -> Self {
        Self { codec }
    }

    /// Validate an access token against the current time.
    pub fn validate_access(&self, token: &str) -> Result<AccessClaims, JwtError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a refresh token against the current time.
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        self.validate_at(token, Utc::now())
    }

    /// Validate a token as of `now`.
    ///
    /// # Errors
    /// * `Malformed` - Token structure or claims could not be decoded
    /// * `SignatureInvalid` - Token was not signed with this secret or was altered
    /// * `Expired` - Expiry is at or before `now`
    pub fn validate_at<C>(&self, token: &str, now: DateTime<Utc>) -> Result<C, JwtError>
    where
        C: Expiring + for<'de> Deserialize<'de>,
    {
        let claims: C = self.codec.decode(token)?;

        if claims.is_expired(now) {
            return Err(JwtError::Expired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::jwt::claims::Identity;
    use crate::jwt::claims::Role;
    use crate::jwt::issuer::TokenIssuer;
    use crate::jwt::issuer::TokenLifetimes;

    const SECRET: &[u8] = b"validator_test_secret_at_least_32_bytes";

    fn setup() -> (TokenIssuer, TokenValidator) {
        let codec = Arc::new(TokenCodec::new(SECRET));
        (
            TokenIssuer::new(Arc::clone(&codec), TokenLifetimes::default()),
            TokenValidator::new(codec),
        )
    }

    fn identity(role: Role) -> Identity {
        Identity {
            email: "carol@example.com".to_string(),
            first_name: "Carol".to_string(),
            last_name: "Danvers".to_string(),
            uid: "9b2e3c52-8f21-4f0b-8a0f-2d6f4c1e7a33".to_string(),
            role,
        }
    }

    #[test]
    fn test_round_trip_reproduces_identity() {
        let (issuer, validator) = setup();

        for role in [Role::Admin, Role::User] {
            let pair = issuer.issue_pair(&identity(role)).unwrap();
            let claims = validator.validate_access(&pair.access_token).unwrap();
            assert_eq!(claims.identity, identity(role));

            assert!(validator.validate_refresh(&pair.refresh_token).is_ok());
        }
    }

    #[test]
    fn test_past_expiry_is_expired() {
        let (issuer, validator) = setup();
        let issued_at = Utc::now() - Duration::hours(25);

        let pair = issuer.issue_pair_at(&identity(Role::User), issued_at).unwrap();

        assert_eq!(
            validator.validate_access(&pair.access_token),
            Err(JwtError::Expired)
        );
        // Refresh token from the same moment is still within its 168h window
        assert!(validator.validate_refresh(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_expiry_elapses() {
        let (issuer, validator) = setup();
        let now = Utc::now();
        let pair = issuer.issue_pair_at(&identity(Role::User), now).unwrap();

        let just_before = now + Duration::hours(24) - Duration::seconds(1);
        let at_expiry = now + Duration::hours(24);

        assert!(validator
            .validate_at::<AccessClaims>(&pair.access_token, just_before)
            .is_ok());
        assert_eq!(
            validator.validate_at::<AccessClaims>(&pair.access_token, at_expiry),
            Err(JwtError::Expired)
        );
    }

    #[test]
    fn test_expired_and_tampered_reports_signature() {
        let (issuer, validator) = setup();
        let pair = issuer
            .issue_pair_at(&identity(Role::User), Utc::now() - Duration::days(30))
            .unwrap();

        let mut tampered = pair.access_token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });

        assert_eq!(
            validator.validate_access(&tampered),
            Err(JwtError::SignatureInvalid)
        );
    }

    #[test]
    fn test_foreign_secret_is_signature_invalid() {
        let (_, validator) = setup();
        let foreign = TokenIssuer::new(
            Arc::new(TokenCodec::new(b"someone_elses_secret_at_least_32_bytes")),
            TokenLifetimes::default(),
        );
        let pair = foreign.issue_pair(&identity(Role::Admin)).unwrap();

        assert_eq!(
            validator.validate_access(&pair.access_token),
            Err(JwtError::SignatureInvalid)
        );
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let (issuer, validator) = setup();
        let pair = issuer.issue_pair(&identity(Role::User)).unwrap();

        assert!(matches!(
            validator.validate_access(&pair.refresh_token),
            Err(JwtError::Malformed(_))
        ));
    }

    #[test]
    fn test_concurrent_validation() {
        let (issuer, validator) = setup();
        let validator = Arc::new(validator);
        let pair = issuer.issue_pair(&identity(Role::User)).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let validator = Arc::clone(&validator);
                let token = pair.access_token.clone();
                std::thread::spawn(move || validator.validate_access(&token).is_ok())
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
