use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;
use serde::Deserialize;

use super::errors::PasswordError;

/// Argon2 cost parameters.
///
/// Fixed for the lifetime of a hasher. Hashes already stored keep the
/// parameters they were produced with, so raising the work factor does not
/// invalidate existing passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WorkFactor {
    /// Memory cost in KiB
    #[serde(default = "WorkFactor::default_memory_kib")]
    pub memory_kib: u32,

    /// Number of passes over memory
    #[serde(default = "WorkFactor::default_iterations")]
    pub iterations: u32,

    /// Degree of parallelism
    #[serde(default = "WorkFactor::default_parallelism")]
    pub parallelism: u32,
}

impl WorkFactor {
    fn default_memory_kib() -> u32 {
        Params::DEFAULT_M_COST
    }

    fn default_iterations() -> u32 {
        Params::DEFAULT_T_COST
    }

    fn default_parallelism() -> u32 {
        Params::DEFAULT_P_COST
    }
}

impl Default for WorkFactor {
    fn default() -> Self {
        Self {
            memory_kib: Self::default_memory_kib(),
            iterations: Self::default_iterations(),
            parallelism: Self::default_parallelism(),
        }
    }
}

/// Password hashing implementation.
///
/// Provides salted, adaptive one-way hashing (Argon2id) with a work factor
/// chosen once at construction.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Create a hasher with the argon2 crate's default cost.
    pub fn new() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }

    /// Create a hasher with an explicit work factor.
    ///
    /// # Errors
    /// * `InvalidWorkFactor` - Parameters are outside Argon2's accepted ranges
    pub fn with_work_factor(work_factor: WorkFactor) -> Result<Self, PasswordError> {
        let params = Params::new(
            work_factor.memory_kib,
            work_factor.iterations,
            work_factor.parallelism,
            None,
        )
        .map_err(|e| PasswordError::InvalidWorkFactor(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password.
    ///
    /// A fresh random salt is generated per call, so hashing the same input
    /// twice gives two different PHC strings that both verify.
    ///
    /// # Errors
    /// * `HashingFailed` - The primitive could not produce a hash
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a plaintext password against a stored PHC hash.
    ///
    /// Returns false on mismatch and on a stored hash that cannot be parsed.
    pub fn verify(&self, stored_hash: &str, password: &str) -> bool {
        let parsed_hash = match PasswordHash::new(stored_hash) {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash is malformed");
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
