//! User records API entry-point: loads settings, prepares the store and
//! serves the REST endpoints.

mod server;

use std::io;

use actix_web::web;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, create_server};
use user_api::inbound::http::health::HealthState;
use user_api::outbound::persistence::{DbPool, run_pending_migrations};
use user_api::settings::AppSettings;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if let Err(e) = fmt().with_env_filter(filter).json().try_init() {
        warn!(error = %e, "tracing init failed");
    }
}

async fn build_config(settings: &AppSettings) -> io::Result<ServerConfig> {
    let bind_addr = settings.bind_addr().map_err(io::Error::other)?;
    let config = ServerConfig::new(bind_addr);
    let Some(pool_config) = settings.pool_config().map_err(io::Error::other)? else {
        warn!("no database_url configured; records are kept in memory");
        return Ok(config);
    };

    if settings.run_migrations() {
        run_pending_migrations(pool_config.database_url())
            .await
            .map_err(io::Error::other)?;
    }
    let pool = DbPool::new(pool_config).await.map_err(io::Error::other)?;
    Ok(config.with_db_pool(pool))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> io::Result<()> {
    init_tracing();

    let settings = AppSettings::load().map_err(|e| io::Error::other(e.to_string()))?;
    let config = build_config(&settings).await?;
    let bind_addr = config.bind_addr;

    let health_state = web::Data::new(HealthState::default());
    let server = create_server(health_state.clone(), config)?;
    info!(%bind_addr, "user records API listening");

    let result = server.await;
    health_state.mark_unhealthy();
    result
}
