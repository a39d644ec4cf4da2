// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0
//! Argon2id password hashing.
//!
//! Hashes are stored in PHC string format, so the parameters travel with the
//! hash and can be raised later without invalidating existing accounts.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHasher as _, Version};

use crate::domain::credentials::{CredentialError, PasswordHasher};
use crate::domain::platform_config::PasswordHashingConfig;

pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    pub fn new(config: &PasswordHashingConfig) -> Result<Self, CredentialError> {
        let params = Params::new(config.memory_kib, config.iterations, config.parallelism, None)
            .map_err(|e| CredentialError::InvalidParameters(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2PasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| CredentialError::Hashing(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2PasswordHasher {
        Argon2PasswordHasher::new(&PasswordHashingConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_hash_is_salted_phc_string() {
        let hasher = hasher();
        let first = hasher.hash("secret123").unwrap();
        let second = hasher.hash("secret123").unwrap();

        assert!(first.starts_with("$argon2id$"));
        assert_ne!(first, "secret123");
        assert_ne!(first, second);
    }

    #[test]
    fn test_hash_verifies_with_embedded_parameters() {
        use argon2::password_hash::PasswordHash;
        use argon2::PasswordVerifier;

        let hash = hasher().hash("secret123").unwrap();
        let parsed = PasswordHash::new(&hash).unwrap();
        assert_eq!(parsed.params.get_decimal("m"), Some(1024));

        let argon2 = Argon2::default();
        assert!(argon2.verify_password(b"secret123", &parsed).is_ok());
        assert!(argon2.verify_password(b"wrong-password", &parsed).is_err());
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let result = Argon2PasswordHasher::new(&PasswordHashingConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(result, Err(CredentialError::InvalidParameters(_))));
    }
}
