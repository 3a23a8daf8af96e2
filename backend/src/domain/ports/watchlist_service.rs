//! Driving port for the watchlist use-cases.
//!
//! Inbound adapters call this port with an already resolved
//! [`RequestContext`]; gated operations decide for themselves whether the
//! context carries enough identity.

use async_trait::async_trait;

use crate::domain::{
    AuthPayload, CatalogKey, Error, LoginCredentials, Registration, RequestContext, SavedItem,
    User,
};

/// Domain use-case port for authentication and saved-item mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WatchlistService: Send + Sync {
    /// Authenticate with email and password.
    async fn login(&self, credentials: &LoginCredentials) -> Result<AuthPayload, Error>;

    /// Create an account and sign the new user in.
    async fn register(&self, registration: &Registration) -> Result<AuthPayload, Error>;

    /// Return the authenticated user.
    async fn fetch_self(&self, ctx: &RequestContext) -> Result<User, Error>;

    /// Add `item` to the authenticated user's saved set.
    async fn save_item(&self, ctx: &RequestContext, item: SavedItem) -> Result<User, Error>;

    /// Remove the item with `key` from the authenticated user's saved set.
    async fn remove_item(&self, ctx: &RequestContext, key: &CatalogKey) -> Result<User, Error>;
}
