//! Credential adapter backed by argon2 and PASETO v4.local tokens.

use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose;
use chrono::{Duration, SecondsFormat, Utc};
use password_hash::SaltString;
use rusty_paseto::prelude::*;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{CredentialError, CredentialService};
use crate::domain::{IdentityToken, PasswordHash, TraceId, UserId};

use super::key::TokenKey;

const SALT_LEN: usize = 16;
const LOCAL_V4_HEADER: &str = "v4.local.";
/// Nonce plus authentication tag carried by every v4.local payload.
const LOCAL_V4_MIN_PAYLOAD: usize = 64;

/// Default lifetime of issued tokens, in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 120;

fn hash_blocking(plaintext: &str) -> Result<PasswordHash, CredentialError> {
    let mut salt_bytes = [0_u8; SALT_LEN];
    getrandom::getrandom(&mut salt_bytes)
        .map_err(|err| CredentialError::hashing(err.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| CredentialError::hashing(err.to_string()))?;
    let phc = Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|err| CredentialError::hashing(err.to_string()))?;
    Ok(PasswordHash::new(phc.to_string()))
}

fn verify_blocking(plaintext: &str, hash: &str) -> bool {
    match password_hash::PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            debug!(error = %err, "stored password hash is malformed");
            false
        }
    }
}

/// Check the token envelope before handing it to the PASETO parser, which
/// slices the decoded payload without bounds checks.
fn has_local_v4_payload(raw: &str) -> bool {
    let Some(rest) = raw.strip_prefix(LOCAL_V4_HEADER) else {
        return false;
    };
    let payload = rest.split_once('.').map_or(rest, |(body, _footer)| body);
    general_purpose::URL_SAFE_NO_PAD
        .decode(payload)
        .is_ok_and(|decoded| decoded.len() >= LOCAL_V4_MIN_PAYLOAD)
}

/// [`CredentialService`] using argon2id password hashes and PASETO
/// v4.local identity tokens signed with a process-wide symmetric key.
pub struct PasetoCredentialService {
    key: PasetoSymmetricKey<V4, Local>,
    ttl: Duration,
}

impl PasetoCredentialService {
    /// Build a service issuing tokens valid for `ttl`.
    pub fn new(key: &TokenKey, ttl: Duration) -> Self {
        Self {
            key: PasetoSymmetricKey::<V4, Local>::from(Key::from(*key.bytes())),
            ttl,
        }
    }
}

#[async_trait]
impl CredentialService for PasetoCredentialService {
    async fn hash_password(&self, plaintext: &str) -> Result<PasswordHash, CredentialError> {
        let plaintext = Zeroizing::new(plaintext.to_owned());
        tokio::task::spawn_blocking(TraceId::carry(move || hash_blocking(&plaintext)))
            .await
            .map_err(|err| CredentialError::hashing(err.to_string()))?
    }

    async fn verify_password(&self, plaintext: &str, hash: &PasswordHash) -> bool {
        let plaintext = Zeroizing::new(plaintext.to_owned());
        let hash = hash.clone();
        tokio::task::spawn_blocking(TraceId::carry(move || {
            verify_blocking(&plaintext, hash.as_ref())
        }))
        .await
        .unwrap_or_else(|err| {
            debug!(error = %err, "password verification task failed");
            false
        })
    }

    fn issue_token(&self, subject: &UserId) -> Result<IdentityToken, CredentialError> {
        let expires = Utc::now()
            .checked_add_signed(self.ttl)
            .ok_or_else(|| CredentialError::token("token expiry is out of range"))?
            .to_rfc3339_opts(SecondsFormat::Secs, true);
        let expiration = ExpirationClaim::try_from(expires.as_str())
            .map_err(|err| CredentialError::token(err.to_string()))?;
        let token = PasetoBuilder::<V4, Local>::default()
            .set_claim(SubjectClaim::from(subject.as_ref()))
            .set_claim(expiration)
            .build(&self.key)
            .map_err(|err| CredentialError::token(err.to_string()))?;
        Ok(IdentityToken::new(token))
    }

    fn verify_token(&self, raw: &str) -> Option<UserId> {
        if !has_local_v4_payload(raw) {
            debug!("identity token is not a well-formed v4.local token");
            return None;
        }
        let claims = match PasetoParser::<V4, Local>::default().parse(raw, &self.key) {
            Ok(claims) => claims,
            Err(err) => {
                debug!(error = %err, "identity token rejected");
                return None;
            }
        };
        let subject = claims.get("sub").and_then(serde_json::Value::as_str)?;
        UserId::new(subject)
            .map_err(|err| debug!(error = %err, "identity token subject is not a user id"))
            .ok()
    }
}
