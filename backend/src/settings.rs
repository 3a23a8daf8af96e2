//! Application settings loaded via OrthoConfig.
//!
//! Values come from `WATCHLIST_*` environment variables, CLI flags or a
//! config file. Everything is optional; accessors supply the defaults.

use std::fmt;
use std::net::{AddrParseError, SocketAddr};
use std::path::{Path, PathBuf};

use chrono::Duration;
use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::outbound::credentials::DEFAULT_TOKEN_TTL_MINUTES;

/// Listen address used when none is configured.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
/// Token key file read when no inline key is configured.
pub const DEFAULT_TOKEN_KEY_FILE: &str = "/var/run/secrets/token_key";
/// Longest accepted token lifetime: one leap year.
pub const MAX_TOKEN_TTL_MINUTES: i64 = 60 * 24 * 366;

/// Invalid setting values detected after loading.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid bind address {value:?}: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: AddrParseError,
    },
    #[error(
        "token lifetime must be between 1 and {max} minutes, got {minutes}",
        max = MAX_TOKEN_TTL_MINUTES
    )]
    TokenTtl { minutes: i64 },
}

/// Process configuration for the watchlist server.
#[derive(Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WATCHLIST")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Inline token signing key (hex, base64 or 32 raw bytes).
    pub token_key: Option<String>,
    /// File holding the token signing key.
    pub token_key_file: Option<PathBuf>,
    /// Identity token lifetime in minutes.
    pub token_ttl_minutes: Option<i64>,
    /// Fall back to a random signing key when none can be loaded.
    #[ortho_config(default = false)]
    pub allow_ephemeral_key: bool,
}

impl fmt::Debug for AppSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppSettings")
            .field("bind_addr", &self.bind_addr)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("token_key", &self.token_key.as_ref().map(|_| "<redacted>"))
            .field("token_key_file", &self.token_key_file)
            .field("token_ttl_minutes", &self.token_ttl_minutes)
            .field("allow_ephemeral_key", &self.allow_ephemeral_key)
            .finish()
    }
}

impl AppSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|source| SettingsError::BindAddr {
            value: value.to_owned(),
            source,
        })
    }

    /// Configured database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Path of the token key file.
    pub fn token_key_file(&self) -> &Path {
        self.token_key_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_TOKEN_KEY_FILE))
    }

    /// Identity token lifetime.
    pub fn token_ttl(&self) -> Result<Duration, SettingsError> {
        let minutes = self.token_ttl_minutes.unwrap_or(DEFAULT_TOKEN_TTL_MINUTES);
        if !(1..=MAX_TOKEN_TTL_MINUTES).contains(&minutes) {
            return Err(SettingsError::TokenTtl { minutes });
        }
        Duration::try_minutes(minutes).ok_or(SettingsError::TokenTtl { minutes })
    }

    /// Whether a random signing key may replace a missing one.
    ///
    /// Always true in debug builds.
    pub fn allow_ephemeral_key(&self) -> bool {
        cfg!(debug_assertions) || self.allow_ephemeral_key
    }
}
