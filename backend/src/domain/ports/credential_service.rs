//! Driven port for password hashing and identity tokens.
//!
//! Token verification deliberately collapses every failure (bad signature,
//! expiry, malformed payload) into `None`; callers only learn whether an
//! identity was proven.

use async_trait::async_trait;

use crate::domain::{IdentityToken, PasswordHash, UserId};

use super::define_port_error;

define_port_error! {
    /// Failures raised while producing credentials.
    pub enum CredentialError {
        /// Password hashing failed.
        Hashing { message: String } => "password hashing failed: {message}",
        /// Token could not be built or signed.
        Token { message: String } => "identity token issuance failed: {message}",
    }
}

/// Port for credential primitives used by the watchlist service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Hash a plaintext password with a fresh random salt.
    async fn hash_password(&self, plaintext: &str) -> Result<PasswordHash, CredentialError>;

    /// Check `plaintext` against a stored hash. Malformed hashes never match.
    async fn verify_password(&self, plaintext: &str, hash: &PasswordHash) -> bool;

    /// Issue a signed, time-limited token for `subject`.
    fn issue_token(&self, subject: &UserId) -> Result<IdentityToken, CredentialError>;

    /// Return the subject of a valid, unexpired token.
    fn verify_token(&self, raw: &str) -> Option<UserId>;
}
