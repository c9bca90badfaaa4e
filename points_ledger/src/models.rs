//! Ledger data models.

use crate::amount::Points;
use serde::{Deserialize, Serialize};

/// Player account identifier (externally supplied)
pub type PlayerId = String;

/// Tournament identifier (caller supplied)
pub type TournamentId = String;

/// Player account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    /// Balance in minor units, never negative once committed
    pub balance: i64,
}

impl Player {
    pub fn balance_points(&self) -> Points {
        Points::from_minor(self.balance)
    }
}

/// Tournament model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    /// Deposit per join, in minor units
    pub deposit: i64,
    pub finished: bool,
}

/// Tournament entry: an account taking part in a tournament, optionally
/// backing another entrant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    pub tournament_id: TournamentId,
    pub entrant_id: PlayerId,
    /// Entrant this account backs; `None` for the root entrant itself
    pub backer_id: Option<PlayerId>,
}

/// Full dump of committed ledger state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub players: Vec<Player>,
    pub tournaments: Vec<Tournament>,
    pub entries: Vec<Entry>,
}

impl LedgerSnapshot {
    /// Sum of all player balances
    pub fn total_balance(&self) -> i64 {
        self.players.iter().map(|p| p.balance).sum()
    }

    /// Balance of a single player, if the account exists
    pub fn balance_of(&self, player_id: &str) -> Option<i64> {
        self.players
            .iter()
            .find(|p| p.id == player_id)
            .map(|p| p.balance)
    }
}
