mod calculator;
mod config;
mod docs;
mod models;
mod reporting;
mod repository;
mod routes;
mod service;

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use calculator::DynamicPackCalculator;
use config::{cli, CalculateConfig, ServerConfig};
use models::PackRequest;
use reporting::display_calculation;
use repository::InMemoryPackRepository;
use service::{PackService, DEFAULT_MAX_QUANTITY};

/// Log to stderr, `info` and above unless RUST_LOG says otherwise
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn build_service(max_quantity: i64) -> PackService {
    PackService::new(
        Box::new(DynamicPackCalculator::new()),
        Arc::new(InMemoryPackRepository::new()),
    )
    .with_max_quantity(max_quantity)
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("serve", sub)) => serve(ServerConfig::from_matches(sub)).await,
        Some(("calculate", sub)) => calculate(CalculateConfig::from_matches(sub)?),
        Some((name, _)) => Err(anyhow!("unknown command {}", name)),
        None => Err(anyhow!("no command given")),
    }
}

async fn serve(config: ServerConfig) -> Result<()> {
    info!("starting pack calculator");
    let service = build_service(config.max_quantity);

    // Seed the store through the service so the sizes get validated
    if !config.pack_sizes.is_empty() {
        let sizes = service.update_pack_sizes(&config.pack_sizes)?;
        info!(?sizes, "pack sizes configured");
    } else {
        info!("no pack sizes configured, set them with PUT /api/pack-sizes");
    }

    let api = routes::routes(Arc::new(service), config.public_url());
    let (address, server) = warp::serve(api).try_bind_with_graceful_shutdown(config.socket_addr()?, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
        }
    })?;

    info!(%address, "server listening");
    info!("API documentation at {}/docs/json", config.public_url());
    server.await;
    info!("server stopped");
    Ok(())
}

fn calculate(config: CalculateConfig) -> Result<()> {
    let service = build_service(DEFAULT_MAX_QUANTITY);
    let request = PackRequest {
        quantity: config.quantity,
        pack_sizes: Some(config.pack_sizes),
    };

    let response = service.calculate_pack_distribution(&request)?;
    if config.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        display_calculation(&response);
    }
    Ok(())
}
