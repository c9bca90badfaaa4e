//! Settlement request and receipt models.

use crate::models::{PlayerId, TournamentId};
use serde::{Deserialize, Serialize};

/// A winner and the prize, in minor units, owed to their group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Winner {
    pub player_id: PlayerId,
    pub prize: i64,
}

impl Winner {
    pub fn new(player_id: impl Into<PlayerId>, prize: i64) -> Self {
        Self {
            player_id: player_id.into(),
            prize,
        }
    }
}

/// Amount moved to or from one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub player_id: PlayerId,
    pub amount: i64,
}

/// Outcome of a committed join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinReceipt {
    pub tournament_id: TournamentId,
    pub entrant_id: PlayerId,
    /// Entrant first, then backers in request order
    pub debits: Vec<Transfer>,
}

impl JoinReceipt {
    pub fn total(&self) -> i64 {
        self.debits.iter().map(|t| t.amount).sum()
    }
}

/// Outcome of a committed finish
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinishReceipt {
    pub tournament_id: TournamentId,
    /// Per winner, the group's accounts in payout order
    pub credits: Vec<Transfer>,
}

impl FinishReceipt {
    pub fn total(&self) -> i64 {
        self.credits.iter().map(|t| t.amount).sum()
    }
}
