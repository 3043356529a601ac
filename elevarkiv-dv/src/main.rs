//! elevarkiv-dv - Student document viewer service
//!
//! Resolves teacher rosters from the upstream source, decides per-student
//! file access and serves archived documents, writing every access
//! decision to the audit log.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use elevarkiv_common::config::Config;
use elevarkiv_common::db::init_database;
use elevarkiv_dv::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "elevarkiv-dv", about = "Student document viewer service")]
struct Args {
    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Listen host (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Listen port (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Database file path (overrides config)
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification first, before anything that can stall
    info!(
        "Starting elevarkiv Document Viewer (elevarkiv-dv) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let mut config = Config::load(args.config.as_ref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }

    if config.mock_collaborators {
        info!("Mock collaborators enabled - serving synthetic roster and archive data");
    }

    let pool = init_database(&config.database_path).await?;

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(pool, config)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("elevarkiv-dv listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
