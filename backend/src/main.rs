//! Service entry-point: loads configuration, selects the credential store and
//! serves the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::WrapErr;
use mockable::{Clock, DefaultClock, DefaultEnv};
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use server::{ServerConfig, ServerSettings, create_server};
use user_auth_api::domain::ports::UserRepository;
use user_auth_api::domain::{TokenCodec, UserService};
use user_auth_api::inbound::http::health::HealthState;
use user_auth_api::inbound::http::state::HttpState;
use user_auth_api::inbound::http::token_config::fingerprint::secret_fingerprint;
use user_auth_api::inbound::http::token_config::{BuildMode, token_settings_from_env};
use user_auth_api::outbound::persistence::{
    DbPool, DieselUserRepository, InMemoryUserRepository, PoolConfig, run_pending_migrations,
};

fn http_state_for<R>(repo: Arc<R>, codec: Arc<TokenCodec>, clock: Arc<dyn Clock>) -> HttpState
where
    R: UserRepository + 'static,
{
    let service = Arc::new(UserService::new(repo, codec, clock));
    HttpState::new(service.clone(), service.clone(), service)
}

async fn build_http_state(
    settings: &ServerSettings,
    codec: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
) -> color_eyre::Result<HttpState> {
    let Some(database_url) = settings.database_url() else {
        warn!("no database configured; users are kept in memory and lost on restart");
        let repo = Arc::new(InMemoryUserRepository::new(clock.clone()));
        return Ok(http_state_for(repo, codec, clock));
    };

    let applied = run_pending_migrations(database_url)
        .await
        .wrap_err("apply database migrations")?;
    let pool = DbPool::new(PoolConfig::new(database_url).with_max_size(settings.pool_max_size()))
        .await
        .wrap_err("build database pool")?;
    info!(
        migrations = applied,
        pool_max_size = settings.pool_max_size(),
        "using PostgreSQL user store"
    );
    let repo = Arc::new(DieselUserRepository::new(pool));
    Ok(http_state_for(repo, codec, clock))
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load().wrap_err("load server settings")?;
    let token_settings =
        token_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
            .wrap_err("load token secret")?;
    info!(
        fingerprint = %secret_fingerprint(&token_settings.secret),
        source = ?token_settings.source,
        "token secret loaded"
    );

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let codec = Arc::new(TokenCodec::new(&token_settings.secret, clock.clone()));
    drop(token_settings);

    let http_state = build_http_state(&settings, codec.clone(), clock).await?;
    let config = ServerConfig::new(http_state, codec, settings.bind_addr());
    info!(bind_addr = %config.bind_addr(), "starting HTTP server");

    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("bind HTTP listener")?;
    server.await.wrap_err("HTTP server terminated")?;
    Ok(())
}
