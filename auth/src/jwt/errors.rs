use thiserror::Error;

/// Error type for JWT operations.
///
/// The rejection variants are the non-valid outcomes of token validation;
/// callers branch on the variant, not on the message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Token is expired")]
    Expired,
}

impl JwtError {
    /// True for outcomes caused by the presented token rather than by the signer.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, JwtError::EncodingFailed(_))
    }
}
