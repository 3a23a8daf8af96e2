//! Symmetric key material for identity tokens.
//!
//! Keys are 32 bytes, supplied as 64 hex characters, base64url or base64 of
//! 32 bytes, or a 32-byte raw string. Anything else is rejected at start-up.

use std::path::Path;

use base64::Engine as _;
use base64::engine::general_purpose;
use zeroize::Zeroizing;

/// Length in bytes of a PASETO v4.local key.
pub const TOKEN_KEY_LEN: usize = 32;

/// Failures while loading token key material.
#[derive(Debug, thiserror::Error)]
pub enum TokenKeyError {
    /// Material did not decode to exactly 32 bytes.
    #[error("token key must be 32 bytes as hex, base64 or raw text")]
    InvalidMaterial,
    /// Key file could not be read.
    #[error("failed to read token key file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The operating system random source failed.
    #[error("failed to generate token key: {message}")]
    Random { message: String },
}

/// 32-byte symmetric key, wiped from memory on drop.
#[derive(Clone)]
pub struct TokenKey(Zeroizing<[u8; TOKEN_KEY_LEN]>);

impl TokenKey {
    /// Decode key material from configuration text.
    ///
    /// ```
    /// use watchlist::outbound::credentials::TokenKey;
    ///
    /// assert!(TokenKey::parse(&"ab".repeat(32)).is_ok());
    /// assert!(TokenKey::parse("short").is_err());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, TokenKeyError> {
        let trimmed = raw.trim();

        if trimmed.len() == TOKEN_KEY_LEN * 2 && trimmed.chars().all(|c| c.is_ascii_hexdigit()) {
            let bytes = Zeroizing::new(
                hex::decode(trimmed).map_err(|_| TokenKeyError::InvalidMaterial)?,
            );
            return Self::from_slice(&bytes);
        }

        for engine in [&general_purpose::URL_SAFE_NO_PAD, &general_purpose::URL_SAFE] {
            if let Ok(bytes) = engine.decode(trimmed).map(Zeroizing::new) {
                if bytes.len() == TOKEN_KEY_LEN {
                    return Self::from_slice(&bytes);
                }
            }
        }
        for engine in [&general_purpose::STANDARD_NO_PAD, &general_purpose::STANDARD] {
            if let Ok(bytes) = engine.decode(trimmed).map(Zeroizing::new) {
                if bytes.len() == TOKEN_KEY_LEN {
                    return Self::from_slice(&bytes);
                }
            }
        }

        Self::from_slice(trimmed.as_bytes())
    }

    /// Read and decode key material from a file.
    pub fn from_file(path: &Path) -> Result<Self, TokenKeyError> {
        let contents = Zeroizing::new(std::fs::read_to_string(path).map_err(|source| {
            TokenKeyError::Read {
                path: path.display().to_string(),
                source,
            }
        })?);
        Self::parse(&contents)
    }

    /// Generate a random key from the operating system.
    pub fn generate() -> Result<Self, TokenKeyError> {
        let mut bytes = Zeroizing::new([0_u8; TOKEN_KEY_LEN]);
        getrandom::getrandom(&mut *bytes).map_err(|err| TokenKeyError::Random {
            message: err.to_string(),
        })?;
        Ok(Self(bytes))
    }

    fn from_slice(bytes: &[u8]) -> Result<Self, TokenKeyError> {
        let array: [u8; TOKEN_KEY_LEN] = bytes
            .try_into()
            .map_err(|_| TokenKeyError::InvalidMaterial)?;
        Ok(Self(Zeroizing::new(array)))
    }

    pub(super) fn bytes(&self) -> &[u8; TOKEN_KEY_LEN] {
        &self.0
    }
}

impl std::fmt::Debug for TokenKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("TokenKey(<redacted>)")
    }
}
