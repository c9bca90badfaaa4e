//! Account endpoints: fund, take and balance.
//!
//! Amounts arrive as decimal points (`points=83.33`) and leave as decimal
//! points; the ledger itself only sees minor units.

use axum::{Json, extract::State};
use points_ledger::{Player, Points};
use serde::Serialize;

use super::{AppState, errors::ApiError, params::Params};
use crate::metrics;

/// Account balance as shown to callers
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceView {
    pub player_id: String,
    pub balance: f64,
}

impl BalanceView {
    fn new(player_id: impl Into<String>, balance: Points) -> Self {
        Self {
            player_id: player_id.into(),
            balance: balance.display_value(),
        }
    }
}

impl From<Player> for BalanceView {
    fn from(player: Player) -> Self {
        let balance = player.balance_points();
        Self::new(player.id, balance)
    }
}

/// Credit `points` to `playerId`, opening the account if needed.
///
/// # Response
///
/// - `200 OK` with the new balance
/// - `422 Unprocessable Entity` on a missing id or a non-positive amount
pub async fn fund(
    State(state): State<AppState>,
    params: Params,
) -> Result<Json<BalanceView>, ApiError> {
    let player_id = params.required("playerId")?;
    let points = params.points("points")?;

    let balance = state
        .engine
        .fund(player_id, points.minor())
        .await
        .map_err(|e| ApiError::ledger("fund", player_id, e))?;

    metrics::ledger_operations_total("fund", "ok");
    metrics::points_moved("fund", points.minor());
    Ok(Json(BalanceView::new(player_id, Points::from_minor(balance))))
}

/// Debit `points` from `playerId`.
///
/// # Response
///
/// - `200 OK` with the new balance
/// - `404 Not Found` for an unknown player
/// - `400 Bad Request` when the balance can't cover the amount
pub async fn take(
    State(state): State<AppState>,
    params: Params,
) -> Result<Json<BalanceView>, ApiError> {
    let player_id = params.required("playerId")?;
    let points = params.points("points")?;

    let balance = state
        .engine
        .take(player_id, points.minor())
        .await
        .map_err(|e| ApiError::ledger("take", player_id, e))?;

    metrics::ledger_operations_total("take", "ok");
    metrics::points_moved("take", points.minor());
    Ok(Json(BalanceView::new(player_id, Points::from_minor(balance))))
}

/// `{"playerId": "P1", "balance": 83.34}`, or 404 for an unknown player.
pub async fn balance(
    State(state): State<AppState>,
    params: Params,
) -> Result<Json<BalanceView>, ApiError> {
    let player_id = params.required("playerId")?;

    let player = state
        .engine
        .player(player_id)
        .await
        .map_err(|e| ApiError::ledger("balance", player_id, e))?;

    metrics::ledger_operations_total("balance", "ok");
    Ok(Json(player.into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_balance_view_shape() {
        let view = BalanceView::new("P1", Points::from_minor(8305));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json, serde_json::json!({"playerId": "P1", "balance": 83.05}));
    }
}
