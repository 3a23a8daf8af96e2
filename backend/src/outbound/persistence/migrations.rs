//! Embedded schema migrations.
//!
//! The SQL under `backend/migrations` is compiled into the binary and applied
//! over a short-lived synchronous connection before the pool starts serving.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::ports::UserPersistenceError;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Apply every pending migration to the database at `database_url`.
///
/// Blocks the calling thread; run it from `spawn_blocking` inside a runtime.
///
/// # Errors
/// Returns a connection error when the database cannot be reached, or a
/// query error when a migration fails.
pub fn run_pending_migrations(database_url: &str) -> Result<(), UserPersistenceError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| UserPersistenceError::connection(err.to_string()))?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| UserPersistenceError::query(format!("migration: {err}")))?;
    info!(count = applied.len(), "database migrations applied");
    Ok(())
}
