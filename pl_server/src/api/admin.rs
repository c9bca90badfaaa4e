//! Operator endpoints: dump and reset.

use axum::{Json, extract::State, http::StatusCode};
use points_ledger::LedgerSnapshot;

use super::{AppState, errors::ApiError};
use crate::metrics;

/// Every account, tournament and entry, in minor units.
pub async fn dump(State(state): State<AppState>) -> Result<Json<LedgerSnapshot>, ApiError> {
    let snapshot = state
        .engine
        .snapshot()
        .await
        .map_err(|e| ApiError::ledger("dump", "ledger", e))?;

    metrics::ledger_operations_total("dump", "ok");
    Ok(Json(snapshot))
}

/// Wipe the ledger. Only served when `ALLOW_RESET` is set; otherwise `403`.
pub async fn reset(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
    if !state.allow_reset {
        return Err(ApiError::forbidden("reset is disabled on this server"));
    }

    state
        .engine
        .reset()
        .await
        .map_err(|e| ApiError::ledger("reset", "ledger", e))?;

    metrics::ledger_operations_total("reset", "ok");
    tracing::warn!("Ledger reset via API");
    Ok(StatusCode::OK)
}
