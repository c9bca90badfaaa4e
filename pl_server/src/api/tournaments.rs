//! Tournament endpoints: announce, join and result.

use axum::{Json, extract::State};
use points_ledger::{FinishReceipt, JoinReceipt, Points, Tournament, Winner};
use serde::{Deserialize, Serialize};

use super::{AppState, errors::ApiError, params::Params};
use crate::metrics;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentView {
    pub tournament_id: String,
    pub deposit: f64,
}

impl From<Tournament> for TournamentView {
    fn from(tournament: Tournament) -> Self {
        Self {
            deposit: Points::from_minor(tournament.deposit).display_value(),
            tournament_id: tournament.id,
        }
    }
}

/// Body of `POST /resultTournament`
///
/// ```json
/// {"tournamentId": "1", "winners": [{"playerId": "P1", "prize": 2000}]}
/// ```
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRequest {
    pub tournament_id: String,
    pub winners: Vec<WinnerPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WinnerPayload {
    pub player_id: String,
    /// Points, as a JSON number or a decimal string
    pub prize: Points,
}

impl From<WinnerPayload> for Winner {
    fn from(payload: WinnerPayload) -> Self {
        Winner::new(payload.player_id, payload.prize.minor())
    }
}

/// Per-account movement, in points
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferView {
    pub player_id: String,
    pub points: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptView {
    pub tournament_id: String,
    pub transfers: Vec<TransferView>,
}

impl From<JoinReceipt> for ReceiptView {
    fn from(receipt: JoinReceipt) -> Self {
        Self::build(receipt.tournament_id, receipt.debits)
    }
}

impl From<FinishReceipt> for ReceiptView {
    fn from(receipt: FinishReceipt) -> Self {
        Self::build(receipt.tournament_id, receipt.credits)
    }
}

impl ReceiptView {
    fn build(tournament_id: String, transfers: Vec<points_ledger::Transfer>) -> Self {
        Self {
            tournament_id,
            transfers: transfers
                .into_iter()
                .map(|t| TransferView {
                    points: Points::from_minor(t.amount).display_value(),
                    player_id: t.player_id,
                })
                .collect(),
        }
    }
}

/// Announce `tournamentId` with a fixed `deposit`.
///
/// # Response
///
/// - `200 OK` with the stored tournament
/// - `422 Unprocessable Entity` for a missing id or a non-positive deposit
/// - `400 Bad Request` if the id is taken
pub async fn announce(
    State(state): State<AppState>,
    params: Params,
) -> Result<Json<TournamentView>, ApiError> {
    let tournament_id = params.required("tournamentId")?;
    let deposit = params.points("deposit")?;

    let tournament = state
        .engine
        .open_tournament(tournament_id, deposit.minor())
        .await
        .map_err(|e| ApiError::ledger("open", tournament_id, e))?;

    metrics::ledger_operations_total("open", "ok");
    Ok(Json(tournament.into()))
}

/// Join `playerId` into `tournamentId`, optionally backed by any number of
/// `backerId`s.
///
/// # Response
///
/// - `200 OK` with the deposit shares debited
/// - `404 Not Found` for an unknown or finished tournament
/// - `400 Bad Request` if a participant is unknown or can't cover their share
pub async fn join(
    State(state): State<AppState>,
    params: Params,
) -> Result<Json<ReceiptView>, ApiError> {
    let tournament_id = params.required("tournamentId")?;
    let player_id = params.required("playerId")?;
    let backer_ids = params.get_all("backerId");

    let receipt = state
        .engine
        .join(tournament_id, player_id, &backer_ids)
        .await
        .map_err(|e| ApiError::ledger("join", tournament_id, e))?;

    metrics::ledger_operations_total("join", "ok");
    metrics::points_moved("join", receipt.total());
    Ok(Json(receipt.into()))
}

/// Settle a tournament and pay each winner's group.
///
/// # Response
///
/// - `200 OK` with the prize shares credited
/// - `404 Not Found` for an unknown or already settled tournament
/// - `400 Bad Request` if a winner never joined
/// - `422 Unprocessable Entity` for a malformed body
pub async fn result(
    State(state): State<AppState>,
    body: Result<Json<ResultRequest>, axum::extract::rejection::JsonRejection>,
) -> Result<Json<ReceiptView>, ApiError> {
    let Json(request) = body.map_err(|rejection| ApiError::unprocessable(rejection.body_text()))?;
    let winners: Vec<Winner> = request.winners.into_iter().map(Winner::from).collect();

    let receipt = state
        .engine
        .finish(&request.tournament_id, &winners)
        .await
        .map_err(|e| ApiError::ledger("finish", &request.tournament_id, e))?;

    metrics::ledger_operations_total("finish", "ok");
    metrics::points_moved("finish", receipt.total());
    metrics::settlement_credits(receipt.credits.len());
    Ok(Json(receipt.into()))
}
