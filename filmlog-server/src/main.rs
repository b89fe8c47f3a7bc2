//! # filmlog Server
//!
//! HTTP adapter for the filmlog UGC service. Records three kinds of
//! per-user, per-film interactions:
//!
//! - **Bookmarks**: idempotent toggle of set membership
//! - **Playback progress**: last-viewed frame, overwrite semantics
//! - **Ratings**: per-user score folded into a per-film (count, average)
//!   aggregate, atomically per film
//!
//! The server is built on Axum and uses PostgreSQL for persistent storage
//! (falling back to an in-memory gateway when none is configured) with
//! JWT bearer tokens for identity.

mod auth;
mod config;
mod errors;
mod handlers;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    routing::get,
};
use clap::{Args as ClapArgs, Parser, Subcommand};
use serde_json::{Value, json};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filmlog_core::storage::{MemoryUgcStore, PostgresUgcStore};

use crate::config::Config;
use crate::state::AppState;

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "filmlog-server")]
#[command(about = "UGC service for film bookmarks, playback progress, and ratings")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(ClapArgs, Debug, Clone)]
struct ServeArgs {
    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Subcommand)]
enum DbCommand {
    /// Apply the UGC schema and exit
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Db(DbCommand::Migrate)) = cli.command {
        return run_db_migrate().await;
    }

    run_server(cli.serve).await
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run_db_migrate() -> anyhow::Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;
    let database_url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL must be set to run migrations")?;

    let store = PostgresUgcStore::connect(database_url)
        .await
        .context("failed to connect to PostgreSQL for migration")?;
    store
        .initialize_schema()
        .await
        .context("schema migration failed")?;
    info!("Database migrations applied successfully");
    Ok(())
}

async fn run_server(args: ServeArgs) -> anyhow::Result<()> {
    init_tracing();

    let mut config =
        Config::from_env().context("failed to load configuration")?;
    if let Some(port) = args.port {
        config.server_port = port;
    }
    if let Some(host) = args.host {
        config.server_host = host;
    }
    let config = Arc::new(config);

    let state = match config.database_url.as_deref() {
        Some(url) => {
            let store = Arc::new(
                PostgresUgcStore::connect(url)
                    .await
                    .context("failed to connect to PostgreSQL")?,
            );
            store.initialize_schema().await?;
            info!("storage backend: PostgreSQL");
            AppState::new(config.clone(), store.clone(), store.clone(), store)
        }
        None => {
            warn!(
                "DATABASE_URL not set; using in-memory storage, state is lost on restart"
            );
            let store = Arc::new(MemoryUgcStore::new());
            AppState::new(config.clone(), store.clone(), store.clone(), store)
        }
    };

    let cors_origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(cors_origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let app: Router = routes::create_api_router()
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("filmlog server listening on {addr}");

    axum::serve(listener, app)
        .await
        .context("server terminated unexpectedly")?;
    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
