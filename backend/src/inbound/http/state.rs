//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on the driving port and remain testable without I/O.

use std::sync::Arc;

use crate::domain::IdentityResolver;
use crate::domain::ports::WatchlistService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub watchlist: Arc<dyn WatchlistService>,
    pub identity: IdentityResolver,
}

impl HttpState {
    /// Construct state from the use-case port and the identity resolver.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use chrono::Duration;
    /// use watchlist::domain::{IdentityResolver, WatchlistGateway};
    /// use watchlist::inbound::http::state::HttpState;
    /// use watchlist::outbound::credentials::{PasetoCredentialService, TokenKey};
    /// use watchlist::outbound::persistence::InMemoryUserRepository;
    ///
    /// let key = TokenKey::generate().expect("random key");
    /// let credentials = Arc::new(PasetoCredentialService::new(&key, Duration::minutes(10)));
    /// let users = Arc::new(InMemoryUserRepository::new());
    /// let gateway = WatchlistGateway::new(users, credentials.clone());
    /// let state = HttpState::new(Arc::new(gateway), IdentityResolver::new(credentials));
    /// let _ = state.watchlist.clone();
    /// ```
    pub fn new(watchlist: Arc<dyn WatchlistService>, identity: IdentityResolver) -> Self {
        Self {
            watchlist,
            identity,
        }
    }
}
