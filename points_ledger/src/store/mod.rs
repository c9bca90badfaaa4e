//! Transactional store capability.
//!
//! The ledger never talks to a database handle directly. Every operation
//! acquires one [`UnitOfWork`] from a [`Store`], performs its reads and
//! writes through it, and commits. A unit of work that is dropped without
//! [`UnitOfWork::commit`] is rolled back, so no error path can leak partial
//! effects.
//!
//! Two implementations are provided:
//! - [`PgStore`]: PostgreSQL via sqlx
//! - [`MemoryStore`]: in-process, fully serialized, for tests and demos

use crate::errors::LedgerResult;
use crate::models::{Entry, LedgerSnapshot, Player, Tournament};
use async_trait::async_trait;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Row lock taken when reading a tournament inside a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TournamentLock {
    /// Held by joins; many joins may proceed together
    Share,
    /// Held by finishes; excludes joins and other finishes
    Update,
}

/// Source of units of work
#[async_trait]
pub trait Store: Send + Sync {
    /// Begin a new unit of work
    async fn begin(&self) -> LedgerResult<Box<dyn UnitOfWork>>;
}

/// Atomic, all-or-nothing group of reads and writes.
#[async_trait]
pub trait UnitOfWork: Send {
    /// Get a player account
    async fn find_player(&mut self, player_id: &str) -> LedgerResult<Option<Player>>;

    /// Row-lock existing accounts in a fixed order, ahead of any balance write
    ///
    /// Two units of work touching overlapping accounts then queue instead of
    /// locking each other's rows in opposite orders. Unknown ids are skipped.
    async fn lock_players(&mut self, player_ids: &[&str]) -> LedgerResult<()>;

    /// Insert a zero-balance account unless one exists; returns the account
    async fn upsert_player(&mut self, player_id: &str) -> LedgerResult<Player>;

    /// Add to a balance; returns the new balance
    ///
    /// Fails with `PlayerNotFound` if the account does not exist.
    async fn credit(&mut self, player_id: &str, amount: i64) -> LedgerResult<i64>;

    /// Subtract from a balance if it stays non-negative; returns the new balance
    ///
    /// The check and the update are one atomic step. Fails with
    /// `InsufficientFunds` (balance untouched) or `PlayerNotFound`.
    async fn debit(&mut self, player_id: &str, amount: i64) -> LedgerResult<i64>;

    /// Insert a tournament; fails with `TournamentExists` on a duplicate id
    async fn insert_tournament(&mut self, tournament_id: &str, deposit: i64)
    -> LedgerResult<Tournament>;

    /// Get a tournament only if it is not finished, locking its row
    async fn find_open_tournament(
        &mut self,
        tournament_id: &str,
        lock: TournamentLock,
    ) -> LedgerResult<Option<Tournament>>;

    /// Record an entry
    async fn insert_entry(
        &mut self,
        tournament_id: &str,
        entrant_id: &str,
        backer_id: Option<&str>,
    ) -> LedgerResult<Entry>;

    /// Accounts in `root_id`'s group: the root's own unbacked entries, then
    /// the entries that back the root, in insertion order. May repeat ids.
    async fn entry_group(&mut self, tournament_id: &str, root_id: &str)
    -> LedgerResult<Vec<String>>;

    /// Flip the finished flag; returns false if no open tournament matched
    async fn mark_finished(&mut self, tournament_id: &str) -> LedgerResult<bool>;

    /// Read everything
    async fn snapshot(&mut self) -> LedgerResult<LedgerSnapshot>;

    /// Delete all entries, tournaments and players
    async fn truncate(&mut self) -> LedgerResult<()>;

    /// Make every change of this unit durable
    async fn commit(self: Box<Self>) -> LedgerResult<()>;
}
