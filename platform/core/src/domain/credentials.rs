// Copyright (c) 2026 Benevole contributors
// SPDX-License-Identifier: AGPL-3.0

use thiserror::Error;

/// One-way, salted password hashing.
///
/// Implementations are CPU-bound; async callers should run them on a
/// blocking thread.
pub trait PasswordHasher: Send + Sync {
    /// Hash `plaintext` into a self-describing PHC string.
    fn hash(&self, plaintext: &str) -> Result<String, CredentialError>;
}

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Invalid hashing parameters: {0}")]
    InvalidParameters(String),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}
