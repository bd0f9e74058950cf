//! Outdoor-adventure API entry-point: seeds the stores and serves `/api`
//! with cookie sessions and image uploads.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::web;
use clap::Parser;
use color_eyre::eyre::{Context, Result};
use mockable::{Clock, DefaultClock, DefaultEnv};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use lvhub::inbound::http::health::HealthState;
use lvhub::server::{
    AdventureAppDependencies, AdventureConfig, BuildMode, build_adventure_state,
    create_adventure_server,
};

/// `adventure-api` command arguments.
#[derive(Debug, Parser)]
#[command(name = "adventure-api", about = "Serve the outdoor-adventure API", version)]
struct CliArgs {
    /// Listen address; overrides `PORT`.
    #[arg(long, value_name = "addr")]
    bind: Option<SocketAddr>,
}

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

    let args = CliArgs::parse();
    let mut config =
        AdventureConfig::from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
            .wrap_err("invalid adventure-api configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let state = build_adventure_state(&config, clock)
        .await
        .wrap_err("failed to prepare adventure stores")?;
    let health_state = web::Data::new(HealthState::new());
    let deps = AdventureAppDependencies::new(&config, web::Data::new(state), health_state);

    let server = create_adventure_server(deps, config.bind_addr)
        .wrap_err_with(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "adventure-api listening");
    server.await.wrap_err("server terminated abnormally")?;
    Ok(())
}
