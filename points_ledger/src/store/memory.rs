//! In-memory store.
//!
//! A unit of work holds the store-wide lock from `begin` until it is committed
//! or dropped, so units of work run one at a time. Changes are staged on a
//! private copy and published only on commit.

use super::{Store, TournamentLock, UnitOfWork};
use crate::errors::{LedgerError, LedgerResult};
use crate::models::{Entry, LedgerSnapshot, Player, Tournament};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Clone, Default)]
struct MemoryState {
    players: BTreeMap<String, i64>,
    tournaments: BTreeMap<String, Tournament>,
    entries: Vec<Entry>,
    next_entry_id: i64,
}

/// Store backed by process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> LedgerResult<Box<dyn UnitOfWork>> {
        let guard = self.state.clone().lock_owned().await;
        let staged = guard.clone();
        Ok(Box::new(MemoryUnitOfWork { guard, staged }))
    }
}

struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    staged: MemoryState,
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn find_player(&mut self, player_id: &str) -> LedgerResult<Option<Player>> {
        Ok(self.staged.players.get(player_id).map(|&balance| Player {
            id: player_id.to_string(),
            balance,
        }))
    }

    async fn lock_players(&mut self, _player_ids: &[&str]) -> LedgerResult<()> {
        // The store-wide guard already excludes every other unit of work
        Ok(())
    }

    async fn upsert_player(&mut self, player_id: &str) -> LedgerResult<Player> {
        let balance = *self
            .staged
            .players
            .entry(player_id.to_string())
            .or_insert(0);
        Ok(Player {
            id: player_id.to_string(),
            balance,
        })
    }

    async fn credit(&mut self, player_id: &str, amount: i64) -> LedgerResult<i64> {
        let balance = self
            .staged
            .players
            .get_mut(player_id)
            .ok_or_else(|| LedgerError::PlayerNotFound(player_id.to_string()))?;
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::InvalidArgument("balance overflow".to_string()))?;
        Ok(*balance)
    }

    async fn debit(&mut self, player_id: &str, amount: i64) -> LedgerResult<i64> {
        let balance = self
            .staged
            .players
            .get_mut(player_id)
            .ok_or_else(|| LedgerError::PlayerNotFound(player_id.to_string()))?;
        if *balance < amount {
            return Err(LedgerError::InsufficientFunds {
                player: player_id.to_string(),
                available: *balance,
                required: amount,
            });
        }
        *balance -= amount;
        Ok(*balance)
    }

    async fn insert_tournament(
        &mut self,
        tournament_id: &str,
        deposit: i64,
    ) -> LedgerResult<Tournament> {
        if self.staged.tournaments.contains_key(tournament_id) {
            return Err(LedgerError::TournamentExists(tournament_id.to_string()));
        }
        let tournament = Tournament {
            id: tournament_id.to_string(),
            deposit,
            finished: false,
        };
        self.staged
            .tournaments
            .insert(tournament_id.to_string(), tournament.clone());
        Ok(tournament)
    }

    async fn find_open_tournament(
        &mut self,
        tournament_id: &str,
        _lock: TournamentLock,
    ) -> LedgerResult<Option<Tournament>> {
        Ok(self
            .staged
            .tournaments
            .get(tournament_id)
            .filter(|t| !t.finished)
            .cloned())
    }

    async fn insert_entry(
        &mut self,
        tournament_id: &str,
        entrant_id: &str,
        backer_id: Option<&str>,
    ) -> LedgerResult<Entry> {
        if !self.staged.tournaments.contains_key(tournament_id) {
            return Err(LedgerError::TournamentNotFound(tournament_id.to_string()));
        }
        for id in std::iter::once(entrant_id).chain(backer_id) {
            if !self.staged.players.contains_key(id) {
                return Err(LedgerError::PlayerNotFound(id.to_string()));
            }
        }

        self.staged.next_entry_id += 1;
        let entry = Entry {
            id: self.staged.next_entry_id,
            tournament_id: tournament_id.to_string(),
            entrant_id: entrant_id.to_string(),
            backer_id: backer_id.map(str::to_string),
        };
        self.staged.entries.push(entry.clone());
        Ok(entry)
    }

    async fn entry_group(
        &mut self,
        tournament_id: &str,
        root_id: &str,
    ) -> LedgerResult<Vec<String>> {
        let entries = &self.staged.entries;
        let own = entries.iter().filter(|e| {
            e.tournament_id == tournament_id && e.entrant_id == root_id && e.backer_id.is_none()
        });
        let backing = entries.iter().filter(|e| {
            e.tournament_id == tournament_id && e.backer_id.as_deref() == Some(root_id)
        });

        Ok(own
            .chain(backing)
            .map(|e| e.entrant_id.clone())
            .collect())
    }

    async fn mark_finished(&mut self, tournament_id: &str) -> LedgerResult<bool> {
        match self.staged.tournaments.get_mut(tournament_id) {
            Some(t) if !t.finished => {
                t.finished = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn snapshot(&mut self) -> LedgerResult<LedgerSnapshot> {
        Ok(LedgerSnapshot {
            players: self
                .staged
                .players
                .iter()
                .map(|(id, &balance)| Player {
                    id: id.clone(),
                    balance,
                })
                .collect(),
            tournaments: self.staged.tournaments.values().cloned().collect(),
            entries: self.staged.entries.clone(),
        })
    }

    async fn truncate(&mut self) -> LedgerResult<()> {
        self.staged = MemoryState::default();
        Ok(())
    }

    async fn commit(self: Box<Self>) -> LedgerResult<()> {
        let MemoryUnitOfWork { mut guard, staged } = *self;
        *guard = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_uncommitted_changes_are_discarded() {
        let store = MemoryStore::new();

        {
            let mut uow = store.begin().await.unwrap();
            uow.upsert_player("P1").await.unwrap();
            uow.credit("P1", 500).await.unwrap();
            // dropped without commit
        }

        let mut uow = store.begin().await.unwrap();
        assert!(uow.find_player("P1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_publishes_changes() {
        let store = MemoryStore::new();

        let mut uow = store.begin().await.unwrap();
        uow.upsert_player("P1").await.unwrap();
        uow.credit("P1", 500).await.unwrap();
        uow.commit().await.unwrap();

        let mut uow = store.begin().await.unwrap();
        let player = uow.find_player("P1").await.unwrap().unwrap();
        assert_eq!(player.balance, 500);
    }

    #[tokio::test]
    async fn test_debit_checks_balance() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        uow.upsert_player("P1").await.unwrap();
        uow.credit("P1", 100).await.unwrap();

        let err = uow.debit("P1", 101).await.unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds {
                available: 100,
                required: 101,
                ..
            }
        ));
        assert_eq!(uow.debit("P1", 100).await.unwrap(), 0);
        assert!(matches!(
            uow.debit("ghost", 1).await,
            Err(LedgerError::PlayerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_entry_group_is_scoped_to_root_and_tournament() {
        let store = MemoryStore::new();
        let mut uow = store.begin().await.unwrap();
        for id in ["P1", "P2", "P3"] {
            uow.upsert_player(id).await.unwrap();
        }
        uow.insert_tournament("1", 100).await.unwrap();
        uow.insert_tournament("2", 100).await.unwrap();

        uow.insert_entry("1", "P1", None).await.unwrap();
        uow.insert_entry("1", "P2", Some("P1")).await.unwrap();
        // P1 backs P3 in the same tournament: belongs to P3's group
        uow.insert_entry("1", "P3", None).await.unwrap();
        uow.insert_entry("1", "P1", Some("P3")).await.unwrap();
        // P3 backs P1 in another tournament
        uow.insert_entry("2", "P1", None).await.unwrap();
        uow.insert_entry("2", "P3", Some("P1")).await.unwrap();

        assert_eq!(uow.entry_group("1", "P1").await.unwrap(), vec!["P1", "P2"]);
        assert_eq!(uow.entry_group("1", "P3").await.unwrap(), vec!["P3", "P1"]);
        assert!(uow.entry_group("1", "P2").await.unwrap().is_empty());
    }
}
