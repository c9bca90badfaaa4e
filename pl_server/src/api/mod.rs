//! HTTP API for the points ledger.
//!
//! Translates untyped HTTP calls into typed ledger operations and the
//! ledger's typed results back into JSON.
//!
//! # Modules
//!
//! - [`ledger`]: fund, take and balance
//! - [`tournaments`]: announce, join and result
//! - [`admin`]: dump and reset
//! - [`middleware`]: request ids, metrics and request logging
//!
//! # Endpoints Overview
//!
//! Parameter routes read the query string and url-encoded bodies alike, so
//! they answer both `GET` and `POST`.
//!
//! ```text
//! GET|POST /fund?playerId=P1&points=300
//! GET|POST /take?playerId=P1&points=300
//! GET|POST /announceTournament?tournamentId=1&deposit=1000
//! GET|POST /joinTournament?tournamentId=1&playerId=P1&backerId=P2&backerId=P3
//! POST     /resultTournament   {"tournamentId":"1","winners":[{"playerId":"P1","prize":2000}]}
//! GET      /balance?playerId=P1
//! GET      /dump
//! GET|POST /reset              (requires ALLOW_RESET)
//! GET      /health
//! ```
//!
//! # Status codes
//!
//! - `422` malformed or missing input
//! - `404` unknown player (fund/take/balance) or unknown/finished tournament
//! - `400` insufficient funds, duplicate tournament, unknown join participant,
//!   winner without entries
//! - `500` store failures; details are logged, never returned
//!
//! # CORS
//!
//! CORS is configured permissively. In production, configure appropriate
//! origins, methods, and headers.

pub mod admin;
pub mod errors;
pub mod ledger;
pub mod middleware;
pub mod params;
pub mod tournaments;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
};
use points_ledger::{SettlementEngine, db::Database};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; the engine is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<SettlementEngine>,
    /// Present when the ledger lives in PostgreSQL; probed by `/health`
    pub database: Option<Database>,
    pub allow_reset: bool,
}

impl AppState {
    pub fn new(engine: SettlementEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            database: None,
            allow_reset: false,
        }
    }

    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    pub fn with_reset(mut self, allow_reset: bool) -> Self {
        self.allow_reset = allow_reset;
        self
    }
}

/// Create the API router with all endpoints and middleware.
///
/// # Example
///
/// ```rust,no_run
/// use pl_server::api::{AppState, create_router};
/// use points_ledger::SettlementEngine;
/// use points_ledger::store::MemoryStore;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let engine = SettlementEngine::new(Arc::new(MemoryStore::new()));
/// let app = create_router(AppState::new(engine));
/// let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/fund", get(ledger::fund).post(ledger::fund))
        .route("/take", get(ledger::take).post(ledger::take))
        .route("/balance", get(ledger::balance))
        .route(
            "/announceTournament",
            get(tournaments::announce).post(tournaments::announce),
        )
        .route(
            "/joinTournament",
            get(tournaments::join).post(tournaments::join),
        )
        .route("/resultTournament", post(tournaments::result))
        .route("/dump", get(admin::dump))
        .route("/reset", get(admin::reset).post(admin::reset))
        .route("/health", get(health_check))
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::track_request))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Health check endpoint for monitoring and load balancers.
///
/// Returns `200 OK` when the store answers, `503 Service Unavailable`
/// otherwise.
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"healthy","storage":"postgres","database":true,"timestamp":"2026-10-17T10:30:00Z"}
/// ```
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let (storage, db_healthy) = match &state.database {
        Some(database) => ("postgres", database.health_check().await.is_ok()),
        None => ("memory", true),
    };

    let status_code = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = json!({
        "status": if db_healthy { "healthy" } else { "unhealthy" },
        "version": env!("CARGO_PKG_VERSION"),
        "storage": storage,
        "database": db_healthy,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    (status_code, Json(response))
}
