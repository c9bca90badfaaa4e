//! Tournament registry: lifecycle and entry roster.

use crate::errors::{LedgerError, LedgerResult};
use crate::ledger::validate_id;
use crate::models::{Entry, Tournament};
use crate::store::{TournamentLock, UnitOfWork};

/// Tournament reads and writes inside a caller-supplied unit of work.
#[derive(Debug, Clone, Copy, Default)]
pub struct TournamentRegistry;

impl TournamentRegistry {
    pub fn new() -> Self {
        Self
    }

    /// Create an open tournament with a fixed deposit
    ///
    /// # Errors
    ///
    /// * `LedgerError::TournamentExists` - id already taken (open or finished)
    /// * `LedgerError::InvalidAmount` - deposit not positive
    pub async fn open(
        &self,
        uow: &mut dyn UnitOfWork,
        tournament_id: &str,
        deposit: i64,
    ) -> LedgerResult<Tournament> {
        validate_id(tournament_id)?;
        if deposit <= 0 {
            return Err(LedgerError::InvalidAmount(deposit));
        }
        let tournament = uow.insert_tournament(tournament_id, deposit).await?;
        log::info!("Opened tournament {tournament_id} with deposit {deposit}");
        Ok(tournament)
    }

    /// Get a tournament that is still open.
    ///
    /// Finished tournaments are reported as `TournamentNotFound`, which is what
    /// makes them impossible to join or settle again.
    pub async fn find(
        &self,
        uow: &mut dyn UnitOfWork,
        tournament_id: &str,
        lock: TournamentLock,
    ) -> LedgerResult<Tournament> {
        validate_id(tournament_id)?;
        uow.find_open_tournament(tournament_id, lock)
            .await?
            .ok_or_else(|| LedgerError::TournamentNotFound(tournament_id.to_string()))
    }

    /// Record that `entrant_id` takes part, backing `backer_id` if given
    pub async fn record_entry(
        &self,
        uow: &mut dyn UnitOfWork,
        tournament_id: &str,
        entrant_id: &str,
        backer_id: Option<&str>,
    ) -> LedgerResult<Entry> {
        uow.insert_entry(tournament_id, entrant_id, backer_id).await
    }

    /// Close a tournament for good
    pub async fn mark_finished(
        &self,
        uow: &mut dyn UnitOfWork,
        tournament_id: &str,
    ) -> LedgerResult<()> {
        if !uow.mark_finished(tournament_id).await? {
            return Err(LedgerError::TournamentNotFound(tournament_id.to_string()));
        }
        log::info!("Tournament {tournament_id} finished");
        Ok(())
    }

    /// Accounts sharing in `root_id`'s result: the root first, then everyone
    /// who backed the root in this tournament, in join order.
    ///
    /// An account appears once even if it joined or backed several times.
    /// Entries where the root backs somebody else are not part of its group.
    pub async fn entries_for(
        &self,
        uow: &mut dyn UnitOfWork,
        tournament_id: &str,
        root_id: &str,
    ) -> LedgerResult<Vec<String>> {
        let rows = uow.entry_group(tournament_id, root_id).await?;

        let mut group: Vec<String> = Vec::with_capacity(rows.len());
        for id in rows {
            if !group.contains(&id) {
                group.push(id);
            }
        }
        Ok(group)
    }
}
