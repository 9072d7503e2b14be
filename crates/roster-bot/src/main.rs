//! Sponsor roster bot entry point
//!
//! One process hosts both the Discord gateway client and the HTTP read API,
//! so the roster cache the admin refresh command invalidates is the same one
//! the API reads. A failed database connection or migration at startup is
//! fatal; after startup, failures degrade into logged replies.

mod commands;
mod directory;
mod handler;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use roster_common::{try_init_tracing, AppConfig, TracingConfig};
use roster_db::{
    create_pool, run_migrations, PgBindingRepository, PgExternalSponsorRepository,
    PgGuildConfigRepository, PgSponsorRepository,
};
use roster_service::{ServiceContext, ServiceContextBuilder};
use serenity::all::{Client, GatewayIntents};
use serenity::http::Http;
use std::time::Duration;
use tracing::{error, info};

use crate::directory::RestDirectory;
use crate::handler::Handler;

#[tokio::main]
async fn main() {
    // Tracing format follows the environment; config itself is loaded below
    let json_logs = std::env::var("APP_ENV").is_ok_and(|env| env.eq_ignore_ascii_case("production"));
    let tracing_config = if json_logs {
        TracingConfig::production()
    } else {
        TracingConfig::default()
    };
    if let Err(e) = try_init_tracing(tracing_config) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = ?e, "Fatal startup error");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let config = Arc::new(AppConfig::from_env().context("loading configuration")?);
    info!(env = ?config.app.env, api_port = config.api.port, "Configuration loaded");

    // Nothing works without the store: fail fast here
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&(&config.database).into())
        .await
        .context("connecting to PostgreSQL")?;
    run_migrations(&pool).await.context("running migrations")?;
    info!("PostgreSQL connection established");

    let http = Arc::new(Http::new(&config.discord.token));
    let rest_directory = Arc::new(RestDirectory::new(http));

    let services: ServiceContext = ServiceContextBuilder::new()
        .guild_repo(Arc::new(PgGuildConfigRepository::new(pool.clone())))
        .sponsor_repo(Arc::new(PgSponsorRepository::new(pool.clone())))
        .binding_repo(Arc::new(PgBindingRepository::new(pool.clone())))
        .external_repo(Arc::new(PgExternalSponsorRepository::new(pool)))
        .directory(rest_directory)
        .roster_ttl(Duration::from_secs(config.cache.roster_ttl_secs))
        .bind_cooldown(Duration::from_secs(config.cache.bind_cooldown_secs))
        .build()
        .map_err(|e| anyhow::anyhow!("service context: {e}"))?;

    // The read API shares the process (and the caches) with the gateway
    let addr: SocketAddr = config
        .api
        .address()
        .parse()
        .context("parsing API listen address")?;
    let api_state = roster_api::AppState::new(Arc::new(services.clone()), config.clone());
    tokio::spawn(async move {
        if let Err(e) = roster_api::serve(api_state, addr).await {
            error!(error = %e, "Read API server exited");
        }
    });

    let intents = GatewayIntents::GUILDS | GatewayIntents::GUILD_MEMBERS;
    let mut client = Client::builder(&config.discord.token, intents)
        .event_handler(Handler::new(services, config))
        .await
        .context("building Discord client")?;

    info!("Starting gateway client...");
    client.start().await.context("running Discord client")?;

    Ok(())
}
