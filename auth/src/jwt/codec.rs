use jsonwebtoken::crypto;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::errors::JwtError;

/// Signs and parses compact JWTs with a shared secret.
///
/// Generic over the claims type. Uses HS256 (HMAC with SHA-256). Expiry is
/// checked by [`TokenValidator`](super::TokenValidator), not here.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl TokenCodec {
    /// Create a codec keyed by `secret`.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - The secret is never written into a token, only the signature derived from it
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode and sign claims.
    ///
    /// # Errors
    /// * `EncodingFailed` - Claims could not be serialized or signed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Verify a token's signature and decode its claims.
    ///
    /// The signature is checked over the raw `header.payload` bytes before
    /// either segment is parsed, so any alteration of a signed token is
    /// reported as `SignatureInvalid` rather than as a parse failure.
    ///
    /// # Errors
    /// * `Malformed` - Token does not have three segments, or the payload does not decode into `T`
    /// * `SignatureInvalid` - Signature does not match the secret
    pub fn decode<T: for<'de> Deserialize<'de>>(&self, token: &str) -> Result<T, JwtError> {
        let (message, signature) = token
            .rsplit_once('.')
            .ok_or_else(|| JwtError::Malformed("expected three dot-separated segments".into()))?;

        if message.split('.').count() != 2 {
            return Err(JwtError::Malformed(
                "expected three dot-separated segments".into(),
            ));
        }

        let signature_matches =
            crypto::verify(signature, message.as_bytes(), &self.decoding_key, self.algorithm)
                .map_err(|_| JwtError::SignatureInvalid)?;

        if !signature_matches {
            return Err(JwtError::SignatureInvalid);
        }

        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => JwtError::SignatureInvalid,
                _ => JwtError::Malformed(e.to_string()),
            })
    }
}
