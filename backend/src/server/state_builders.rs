//! Builders wiring adapters into the HTTP state.

use std::sync::Arc;

use tracing::info;
use watchlist::domain::ports::UserRepository;
use watchlist::domain::{IdentityResolver, WatchlistGateway};
use watchlist::inbound::http::state::HttpState;
use watchlist::outbound::credentials::PasetoCredentialService;
use watchlist::outbound::persistence::{DieselUserRepository, InMemoryUserRepository};

use super::ServerConfig;

/// Pick the user repository: PostgreSQL when a pool is configured, otherwise
/// a process-local store that forgets everything on restart.
fn build_user_repository(config: &ServerConfig) -> Arc<dyn UserRepository> {
    match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL user repository");
            Arc::new(DieselUserRepository::new(pool.clone()))
        }
        None => {
            info!("no database configured; using in-memory user repository");
            Arc::new(InMemoryUserRepository::new())
        }
    }
}

/// Build the HTTP state shared by every worker.
pub(crate) fn build_http_state(config: &ServerConfig) -> HttpState {
    let credentials = Arc::new(PasetoCredentialService::new(
        &config.token_key,
        config.token_ttl,
    ));
    let users = build_user_repository(config);
    let gateway = WatchlistGateway::new(users, Arc::clone(&credentials));
    HttpState::new(Arc::new(gateway), IdentityResolver::new(credentials))
}
