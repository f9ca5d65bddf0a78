use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use worklog_api::{api, config, store::postgres::PgStore, AppState};

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Migrate { database_url }) => {
            let url = database_url.unwrap_or_else(|| cfg.database_url.clone());
            run_migrations(&url).await
        }
        None => run_server(cfg, None).await,
    };

    if let Err(ref e) = result {
        tracing::error!("fatal: {:?}", e);
    }
    result
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "worklog_api=debug,tower_http=debug".into()),
    );
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run_migrations(database_url: &str) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(database_url).await?;

    tracing::info!("Running migrations...");
    db.migrate().await?;
    tracing::info!("Migrations applied");
    Ok(())
}

async fn run_server(cfg: config::Config, port: Option<u16>) -> anyhow::Result<()> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url).await?;

    let state = Arc::new(AppState::new(&cfg, Arc::new(db)));
    let app = api::app(state, &cfg.cors_origins)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], port.unwrap_or(cfg.port)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(origins = ?cfg.cors_origins, "worklog API listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
