//! User persistence adapters.
//!
//! - [`DieselUserRepository`]: PostgreSQL via Diesel, `diesel-async` and
//!   `bb8` pooling. Row structs (`models.rs`) and table definitions
//!   (`schema.rs`) stay private to this module.
//! - [`InMemoryUserRepository`]: a mutex-guarded document store for local
//!   runs and tests.
//!
//! [`run_pending_migrations`] applies the embedded schema at start-up.
//!
//! Both adapters translate storage failures into
//! [`UserPersistenceError`](crate::domain::ports::UserPersistenceError) and
//! contain no business logic.
//!
//! ```no_run
//! use watchlist::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn wire() -> Result<(), watchlist::outbound::persistence::PoolError> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/watchlist")).await?;
//! let repo = DieselUserRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_user_repository;
mod in_memory_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_user_repository::DieselUserRepository;
pub use in_memory_user_repository::InMemoryUserRepository;
pub use migrations::run_pending_migrations;
pub use pool::{DbPool, PoolConfig, PoolError};
