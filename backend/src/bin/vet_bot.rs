//! Veterinary assistant entry-point: loads configuration, wires the bot and
//! serves the `/api/v1` surface until a signal or an admin restart request.
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
    BuildMode, VetAppDependencies, VetBotConfig, build_vet_state, create_vet_server,
};

/// `vet-bot` command arguments.
#[derive(Debug, Parser)]
#[command(name = "vet-bot", about = "Serve the AI veterinary assistant", version)]
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
    let mut config = VetBotConfig::from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid vet-bot configuration")?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    config.log_summary();

    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let state = web::Data::new(build_vet_state(&config, Arc::clone(&clock)));
    let health_state = web::Data::new(HealthState::new());
    let deps = VetAppDependencies::new(&config, state.clone(), health_state.clone(), clock);

    let server = create_vet_server(deps, config.bind_addr)
        .wrap_err_with(|| format!("failed to bind {}", config.bind_addr))?;
    info!(addr = %config.bind_addr, "vet-bot listening");

    let handle = server.handle();
    let restart = Arc::clone(&state.restart);
    tokio::spawn(async move {
        restart.notified().await;
        info!("restart requested; draining connections");
        health_state.mark_unhealthy();
        handle.stop(true).await;
    });

    server.await.wrap_err("server terminated abnormally")?;
    state.bot.shutdown().await;
    info!("vet-bot stopped");
    Ok(())
}
