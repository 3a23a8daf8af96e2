//! Watchlist server entry-point: loads settings, wires adapters and serves
//! the REST API.

mod server;

use actix_web::web;
use ortho_config::OrthoConfig as _;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use watchlist::inbound::http::health::HealthState;
use watchlist::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use watchlist::settings::AppSettings;

use server::{ServerConfig, create_server, resolve_token_key};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;
    let bind_addr = settings.bind_addr().map_err(std::io::Error::other)?;
    let token_ttl = settings.token_ttl().map_err(std::io::Error::other)?;
    let token_key = resolve_token_key(&settings)?;

    let mut config = ServerConfig::new(bind_addr, token_key, token_ttl);
    if let Some(url) = settings.database_url() {
        let migration_url = url.to_owned();
        tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
            .await
            .map_err(std::io::Error::other)?
            .map_err(std::io::Error::other)?;
        let pool = DbPool::new(PoolConfig::new(url))
            .await
            .map_err(|err| std::io::Error::other(err.into_message()))?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    info!(%bind_addr, "watchlist server listening");
    server.await
}
