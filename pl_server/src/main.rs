//! Points ledger server.
//!
//! Serves the ledger over HTTP, backed by PostgreSQL or, for local runs,
//! process memory.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Error;
use pico_args::Arguments;
use pl_server::{
    api::{AppState, create_router},
    config::{ServerConfig, StorageBackend},
    logging, metrics,
};
use points_ledger::{
    SettlementEngine,
    db::Database,
    store::{MemoryStore, PgStore, Store},
};

const HELP: &str = "\
Run the points ledger server

USAGE:
  pl_server [OPTIONS]

OPTIONS:
  --bind       IP:PORT     Server socket bind address  [default: env SERVER_BIND or 127.0.0.1:8080]
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  --memory                 Keep the ledger in memory instead of PostgreSQL
  -h, --help               Print help information

ENVIRONMENT:
  SERVER_BIND              Server bind address (e.g., 0.0.0.0:8080)
  STORAGE                  postgres | memory
  DATABASE_URL             PostgreSQL connection string
  TRANSACTION_TIMEOUT_SECS Deadline for a single ledger operation
  METRICS_BIND             Prometheus scrape address (disabled when unset)
  ALLOW_RESET              Serve /reset (true/false)
  (See .env file for all configuration options)
";

struct Args {
    bind: Option<SocketAddr>,
    database_url: Option<String>,
    memory: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        bind: pargs.opt_value_from_str("--bind")?,
        database_url: pargs.opt_value_from_str("--db-url")?,
        memory: pargs.contains("--memory"),
    };

    logging::init();

    let config = ServerConfig::from_env(args.bind, args.database_url, args.memory)?;
    config.validate()?;

    if let Some(metrics_bind) = config.metrics_bind {
        metrics::init_metrics(metrics_bind).map_err(|e| anyhow::anyhow!(e))?;
        tracing::info!("Prometheus metrics exposed at http://{}/metrics", metrics_bind);
    }

    let (store, database): (Arc<dyn Store>, Option<Database>) = match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; the ledger is lost on exit");
            (Arc::new(MemoryStore::new()), None)
        }
        StorageBackend::Postgres => {
            let db = Database::new(&config.database)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
            db.migrate()
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create ledger schema: {}", e))?;
            tracing::info!("Database connected successfully");

            let pool = Arc::new(db.pool().clone());
            (Arc::new(PgStore::new(pool)), Some(db))
        }
    };

    let engine =
        SettlementEngine::new(store).with_transaction_timeout(config.transaction_timeout());

    let mut state = AppState::new(engine).with_reset(config.allow_reset);
    if let Some(db) = database.clone() {
        state = state.with_database(db);
    }
    if config.allow_reset {
        tracing::warn!("/reset is enabled; any caller can wipe the ledger");
    }

    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(config.bind).await?;
    tracing::info!("Points ledger listening on {}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(db) = database {
        db.close().await;
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
