//! Backend entry-point: loads settings, prepares storage, and serves the REST API.

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use skillswap::inbound::http::health::HealthState;
use skillswap::outbound::persistence::{DbPool, run_migrations};
use skillswap::server::{
    AppSettings, BuildMode, ServerConfig, create_server, session_settings_from_env,
};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let session = session_settings_from_env(
        &mockable::DefaultEnv::new(),
        BuildMode::from_debug_assertions(),
    )
    .wrap_err("invalid session configuration")?;

    let mut config = ServerConfig::new(session, settings.bind_addr()?)
        .with_moderation(settings.moderation_policy());

    if let Some(pool_config) = settings.pool_config() {
        let applied = run_migrations(pool_config.database_url())
            .await
            .wrap_err("failed to run database migrations")?;
        info!(applied, "database migrations complete");
        let pool = DbPool::connect(&pool_config)
            .await
            .wrap_err("failed to connect to the database")?;
        config = config.with_db_pool(pool);
    }

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config)?;
    server.await.wrap_err("server terminated with an error")
}
