//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_service;
mod user_repository;
mod watchlist_service;

#[cfg(test)]
pub use credential_service::MockCredentialService;
pub use credential_service::{CredentialError, CredentialService};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use watchlist_service::MockWatchlistService;
pub use watchlist_service::WatchlistService;
