//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use chrono::Duration;
use tracing::warn;
use watchlist::outbound::credentials::{TokenKey, TokenKeyError};
use watchlist::outbound::persistence::DbPool;
use watchlist::settings::AppSettings;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) token_key: TokenKey,
    pub(crate) token_ttl: Duration,
    pub(crate) db_pool: Option<DbPool>,
}

impl ServerConfig {
    /// Construct a configuration backed by the in-memory user store.
    #[must_use]
    pub fn new(bind_addr: SocketAddr, token_key: TokenKey, token_ttl: Duration) -> Self {
        Self {
            bind_addr,
            token_key,
            token_ttl,
            db_pool: None,
        }
    }

    /// Attach a database connection pool so users persist in PostgreSQL.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }
}

/// Resolve the token signing key from settings.
///
/// An inline key wins over the key file. When the file cannot be read and
/// ephemeral keys are allowed, a random key is generated; tokens issued with
/// it stop verifying once the process restarts.
///
/// # Errors
/// Returns an error for malformed key material, or for an unreadable key file
/// when ephemeral keys are not allowed.
pub fn resolve_token_key(settings: &AppSettings) -> std::io::Result<TokenKey> {
    if let Some(raw) = settings.token_key.as_deref() {
        return TokenKey::parse(raw).map_err(std::io::Error::other);
    }

    let path = settings.token_key_file();
    match TokenKey::from_file(path) {
        Ok(key) => Ok(key),
        Err(err @ TokenKeyError::Read { .. }) if settings.allow_ephemeral_key() => {
            warn!(path = %path.display(), error = %err, "using temporary token key (dev only)");
            TokenKey::generate().map_err(std::io::Error::other)
        }
        Err(err) => Err(std::io::Error::other(err)),
    }
}
