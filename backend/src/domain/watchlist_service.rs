//! Watchlist use-cases: authentication and saved-item mutations.
//!
//! Gated operations check the [`RequestContext`] before touching the
//! repository, so an anonymous call never reaches storage. Saved-set
//! mutations are single repository calls and are safe to retry.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info};

use crate::domain::ports::{
    CredentialError, CredentialService, UserPersistenceError, UserRepository, WatchlistService,
};
use crate::domain::{
    AuthPayload, CatalogKey, Error, LOGIN_REQUIRED, LoginCredentials, PasswordHash, Registration,
    RequestContext, SavedItem, User, UserId, UserRecord,
};

/// Message returned for every failed login, whatever the cause.
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// Well-formed argon2id hash that matches no password. Unknown emails are
/// verified against it so both login failures cost one full verification.
pub const DECOY_PASSWORD_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$d2F0Y2hsaXN0LWRlY295IQ$AAECAwQFBgcICQoLDA0ODxAREhMUFRYXGBkaGxwdHh8";

/// Service implementing [`WatchlistService`] over a repository and a
/// credential provider.
pub struct WatchlistGateway<R: ?Sized, C: ?Sized> {
    users: Arc<R>,
    credentials: Arc<C>,
}

impl<R: ?Sized, C: ?Sized> Clone for WatchlistGateway<R, C> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            credentials: Arc::clone(&self.credentials),
        }
    }
}

impl<R: ?Sized, C: ?Sized> WatchlistGateway<R, C> {
    /// Create a service over the given adapters.
    pub fn new(users: Arc<R>, credentials: Arc<C>) -> Self {
        Self { users, credentials }
    }
}

fn map_persistence_error(err: UserPersistenceError) -> Error {
    error!(error = %err, "user repository failure");
    match err {
        UserPersistenceError::Connection { .. } => {
            Error::service_unavailable("user store unavailable")
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user store query failed: {message}"))
        }
        UserPersistenceError::Duplicate { field } => {
            Error::internal(format!("unexpected duplicate {field}"))
        }
    }
}

fn map_credential_error(err: CredentialError) -> Error {
    error!(error = %err, "credential failure");
    Error::internal(err.to_string())
}

fn already_registered(field: &str) -> Error {
    Error::invalid_request(format!("{field} already registered"))
        .with_details(json!({ "field": field, "code": "duplicate" }))
}

impl<R, C> WatchlistGateway<R, C>
where
    R: UserRepository + ?Sized,
    C: CredentialService + ?Sized,
{
    fn authenticated(&self, user: User) -> Result<AuthPayload, Error> {
        let token = self
            .credentials
            .issue_token(user.id())
            .map_err(map_credential_error)?;
        Ok(AuthPayload { token, user })
    }

    fn require_existing(user: Option<User>) -> Result<User, Error> {
        user.ok_or_else(|| Error::unauthorized(LOGIN_REQUIRED))
    }

    async fn ensure_unique(&self, registration: &Registration) -> Result<(), Error> {
        let email = registration.email().as_ref();
        if self
            .users
            .find_by_email(email)
            .await
            .map_err(map_persistence_error)?
            .is_some()
        {
            return Err(already_registered("email"));
        }

        let username = registration.username().as_ref();
        if self
            .users
            .find_by_username(username)
            .await
            .map_err(map_persistence_error)?
            .is_some()
        {
            return Err(already_registered("username"));
        }
        Ok(())
    }
}

#[async_trait]
impl<R, C> WatchlistService for WatchlistGateway<R, C>
where
    R: UserRepository + ?Sized,
    C: CredentialService + ?Sized,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload, Error> {
        let found = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_persistence_error)?;

        let Some(record) = found else {
            let decoy = PasswordHash::new(DECOY_PASSWORD_HASH);
            self.credentials
                .verify_password(credentials.password(), &decoy)
                .await;
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        if !self
            .credentials
            .verify_password(credentials.password(), &record.password_hash)
            .await
        {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        info!(user_id = %record.user.id(), "user logged in");
        self.authenticated(record.user)
    }

    async fn register(&self, registration: &Registration) -> Result<AuthPayload, Error> {
        self.ensure_unique(registration).await?;

        let password_hash = self
            .credentials
            .hash_password(registration.password())
            .await
            .map_err(map_credential_error)?;
        let user = User::new(
            UserId::random(),
            registration.username().clone(),
            registration.email().clone(),
        );
        let record = UserRecord {
            user,
            password_hash,
        };

        match self.users.create(&record).await {
            Ok(()) => {}
            Err(UserPersistenceError::Duplicate { field }) => {
                return Err(already_registered(&field));
            }
            Err(err) => return Err(map_persistence_error(err)),
        }

        info!(user_id = %record.user.id(), "user registered");
        self.authenticated(record.user)
    }

    async fn fetch_self(&self, ctx: &RequestContext) -> Result<User, Error> {
        let user_id = ctx.require_user()?;
        let record = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_persistence_error)?;
        Self::require_existing(record.map(|found| found.user))
    }

    async fn save_item(&self, ctx: &RequestContext, item: SavedItem) -> Result<User, Error> {
        let user_id = ctx.require_user()?;
        let user = self
            .users
            .add_to_saved_set(user_id, &item)
            .await
            .map_err(map_persistence_error)?;
        Self::require_existing(user)
    }

    async fn remove_item(&self, ctx: &RequestContext, key: &CatalogKey) -> Result<User, Error> {
        let user_id = ctx.require_user()?;
        let user = self
            .users
            .remove_from_saved_set(user_id, key)
            .await
            .map_err(map_persistence_error)?;
        Self::require_existing(user)
    }
}

#[cfg(test)]
#[path = "watchlist_service_tests.rs"]
mod tests;
