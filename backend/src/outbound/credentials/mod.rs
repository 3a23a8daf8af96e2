//! Credential adapters: password hashing and identity tokens.

mod key;
mod paseto_credential_service;

pub use key::{TOKEN_KEY_LEN, TokenKey, TokenKeyError};
pub use paseto_credential_service::{DEFAULT_TOKEN_TTL_MINUTES, PasetoCredentialService};
