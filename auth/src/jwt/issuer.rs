use std::sync::Arc;

use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::claims::AccessClaims;
use super::claims::Identity;
use super::claims::RefreshClaims;
use super::codec::TokenCodec;
use super::errors::JwtError;

/// Lifetimes of issued tokens, in hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access_token_hours: i64,
    pub refresh_token_hours: i64,
}

impl TokenLifetimes {
    /// Longest lifetime accepted from configuration (ten years).
    pub const MAX_HOURS: i64 = 24 * 365 * 10;

    fn default_access_hours() -> i64 {
        24
    }

    fn default_refresh_hours() -> i64 {
        168
    }

    pub fn access(&self) -> Result<Duration, JwtError> {
        Self::hours(self.access_token_hours)
    }

    pub fn refresh(&self) -> Result<Duration, JwtError> {
        Self::hours(self.refresh_token_hours)
    }

    /// True when both lifetimes are positive and at most [`Self::MAX_HOURS`].
    pub fn is_within_bounds(&self) -> bool {
        [self.access_token_hours, self.refresh_token_hours]
            .iter()
            .all(|hours| (1..=Self::MAX_HOURS).contains(hours))
    }

    fn hours(hours: i64) -> Result<Duration, JwtError> {
        Duration::try_hours(hours).ok_or_else(|| {
            JwtError::EncodingFailed(format!("token lifetime of {} hours is out of range", hours))
        })
    }
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access_token_hours: Self::default_access_hours(),
            refresh_token_hours: Self::default_refresh_hours(),
        }
    }
}

/// Independently signed access and refresh tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Builds token pairs for authenticated identities.
pub struct TokenIssuer {
    codec: Arc<TokenCodec>,
    lifetimes: TokenLifetimes,
}

impl TokenIssuer {
    pub fn new(codec: Arc<TokenCodec>, lifetimes: TokenLifetimes) -> Self {
        Self { codec, lifetimes }
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// Issue an access/refresh pair for `identity`, starting now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Either token could not be signed
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, JwtError> {
        self.issue_pair_at(identity, Utc::now())
    }

    /// Issue an access/refresh pair as of `issued_at`.
    pub fn issue_pair_at(
        &self,
        identity: &Identity,
        issued_at: DateTime<Utc>,
    ) -> Result<TokenPair, JwtError> {
        let access_claims =
            AccessClaims::new(identity.clone(), issued_at, self.lifetimes.access()?)?;
        let refresh_claims = RefreshClaims::new(issued_at, self.lifetimes.refresh()?)?;

        let access_token = self.codec.encode(&access_claims)?;
        let refresh_token = self.codec.encode(&refresh_claims)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
        })
    }
}
