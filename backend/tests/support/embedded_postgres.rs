//! Embedded PostgreSQL databases for Diesel adapter tests.
//!
//! Each test gets its own temporary database on the shared cluster, migrated
//! with the same embedded migrations the server applies at start-up.

use std::time::Duration;

use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use watchlist::outbound::persistence::run_pending_migrations;

const CLUSTER_RETRIES: usize = 5;
const CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Provision a migrated temporary database.
///
/// The database is dropped with the returned handle.
pub fn migrated_database() -> Result<TemporaryDatabase, String> {
    let mut attempt = 1;
    let cluster = loop {
        match shared_cluster_handle() {
            Ok(handle) => break handle,
            Err(_) if attempt < CLUSTER_RETRIES => {
                attempt += 1;
                std::thread::sleep(CLUSTER_RETRY_DELAY);
            }
            Err(err) => return Err(format!("start cluster: {err:?}")),
        }
    };

    let database = cluster
        .create_temporary_database()
        .map_err(|err| format!("create database: {err:?}"))?;
    let url = database.url().to_string();
    run_pending_migrations(&url).map_err(|err| format!("migrate: {err}"))?;
    Ok(database)
}
