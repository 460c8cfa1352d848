//! Password credentials.
//!
//! Passwords are never stored. Each account keeps an Argon2id hash in PHC
//! string form (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so the
//! parameters used at registration travel with the hash and verification
//! keeps working after the configured cost changes.

use std::fmt;

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default Argon2id parameters (OWASP minimum recommendation)
pub const DEFAULT_MEMORY_COST_KIB: u32 = 19 * 1024;
pub const DEFAULT_TIME_COST: u32 = 2;
pub const DEFAULT_PARALLELISM: u32 = 1;

/// Salt length in bytes
const SALT_LEN: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("failed to hash password: {0}")]
    Hashing(String),
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashingParams {
    pub memory_cost_kib: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for HashingParams {
    fn default() -> Self {
        Self {
            memory_cost_kib: DEFAULT_MEMORY_COST_KIB,
            time_cost: DEFAULT_TIME_COST,
            parallelism: DEFAULT_PARALLELISM,
        }
    }
}

impl HashingParams {
    /// The cheapest parameters Argon2 accepts. Only meant for tests.
    pub fn insecure_fast() -> Self {
        Self {
            memory_cost_kib: Params::MIN_M_COST,
            time_cost: Params::MIN_T_COST,
            parallelism: Params::MIN_P_COST,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, CredentialError> {
        let params = Params::new(self.memory_cost_kib, self.time_cost, self.parallelism, None)
            .map_err(|e| CredentialError::InvalidParams(e.to_string()))?;
        Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }
}

/// A salted one-way hash of an account password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    phc: String,
}

impl Credential {
    /// Hash `password` with a fresh random salt.
    pub fn hash(password: &str, params: &HashingParams) -> Result<Self, CredentialError> {
        let salt_bytes: [u8; SALT_LEN] = rand::random();
        let salt = SaltString::encode_b64(&salt_bytes)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?;

        let phc = params
            .hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| CredentialError::Hashing(e.to_string()))?
            .to_string();

        Ok(Self { phc })
    }

    /// Returns true iff `password` matches the stored hash.
    pub fn verify(&self, password: &str) -> bool {
        match PasswordHash::new(&self.phc) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}
