//! Settlement engine.

use super::models::{FinishReceipt, JoinReceipt, Transfer, Winner};
use crate::amount::Points;
use crate::db::timeouts::{DEFAULT_TRANSACTION_TIMEOUT, with_timeout};
use crate::errors::{LedgerError, LedgerResult};
use crate::ledger::{AccountLedger, validate_id};
use crate::models::{LedgerSnapshot, Player, Tournament};
use crate::split::split_evenly;
use crate::store::{Store, TournamentLock, UnitOfWork};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::tournament::TournamentRegistry;

/// Settlement engine
///
/// Holds no mutable state of its own; the store is the single arbiter of
/// concurrent access.
#[derive(Clone)]
pub struct SettlementEngine {
    store: Arc<dyn Store>,
    ledger: AccountLedger,
    registry: TournamentRegistry,
    transaction_timeout: Duration,
}

impl SettlementEngine {
    /// Create a new settlement engine over `store`
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            ledger: AccountLedger::new(),
            registry: TournamentRegistry::new(),
            transaction_timeout: DEFAULT_TRANSACTION_TIMEOUT,
        }
    }

    /// Bound every unit of work by `timeout`
    pub fn with_transaction_timeout(mut self, timeout: Duration) -> Self {
        self.transaction_timeout = timeout;
        self
    }

    /// Credit a player directly, creating the account if needed
    ///
    /// # Returns
    ///
    /// * `LedgerResult<i64>` - New balance in minor units
    pub async fn fund(&self, player_id: &str, amount: i64) -> LedgerResult<i64> {
        let result = with_timeout(self.transaction_timeout, async {
            let mut uow = self.store.begin().await?;
            self.ledger.find_or_create(uow.as_mut(), player_id).await?;
            let balance = self.ledger.credit(uow.as_mut(), player_id, amount).await?;
            uow.commit().await?;
            Ok(balance)
        })
        .await;

        log_outcome("fund", player_id, &result);
        result
    }

    /// Debit a player directly
    ///
    /// # Errors
    ///
    /// * `LedgerError::PlayerNotFound` - unknown player
    /// * `LedgerError::InsufficientFunds` - balance too low; nothing changes
    pub async fn take(&self, player_id: &str, amount: i64) -> LedgerResult<i64> {
        let result = with_timeout(self.transaction_timeout, async {
            let mut uow = self.store.begin().await?;
            let balance = self.ledger.debit(uow.as_mut(), player_id, amount).await?;
            uow.commit().await?;
            Ok(balance)
        })
        .await;

        log_outcome("take", player_id, &result);
        result
    }

    /// Announce a tournament with a fixed deposit
    pub async fn open_tournament(
        &self,
        tournament_id: &str,
        deposit: i64,
    ) -> LedgerResult<Tournament> {
        let result = with_timeout(self.transaction_timeout, async {
            let mut uow = self.store.begin().await?;
            let tournament = self.registry.open(uow.as_mut(), tournament_id, deposit).await?;
            uow.commit().await?;
            Ok(tournament)
        })
        .await;

        log_outcome("open", tournament_id, &result);
        result
    }

    /// Get a tournament that is still open
    pub async fn tournament(&self, tournament_id: &str) -> LedgerResult<Tournament> {
        with_timeout(self.transaction_timeout, async {
            let mut uow = self.store.begin().await?;
            self.registry
                .find(uow.as_mut(), tournament_id, TournamentLock::Share)
                .await
        })
        .await
    }

    /// Enter `entrant_id` into a tournament, splitting the deposit evenly
    /// across the entrant and `backer_ids`.
    ///
    /// With backers, the deposit is split in the order `[entrant, backers...]`
    /// and the leading participants absorb the remainder. Each call is a new
    /// participation: joining twice debits twice.
    ///
    /// # Errors
    ///
    /// * `LedgerError::TournamentNotFound` - unknown or finished tournament
    /// * `LedgerError::InsufficientFunds` - some participant can't cover their share
    /// * `LedgerError::PlayerNotFound` - some backer has no account
    /// * `LedgerError::InvalidArgument` - empty, repeated or self-backing ids
    ///
    /// On any error no debit and no entry is committed.
    pub async fn join(
        &self,
        tournament_id: &str,
        entrant_id: &str,
        backer_ids: &[String],
    ) -> LedgerResult<JoinReceipt> {
        let result = with_timeout(self.transaction_timeout, async {
            validate_participants(entrant_id, backer_ids)?;

            let mut uow = self.store.begin().await?;
            let receipt = self
                .collect_deposit(uow.as_mut(), tournament_id, entrant_id, backer_ids)
                .await?;
            uow.commit().await?;
            Ok(receipt)
        })
        .await;

        match &result {
            Ok(receipt) => {
                log::info!(
                    "{} joined tournament {} with {} backer(s), collected {}",
                    entrant_id,
                    tournament_id,
                    backer_ids.len(),
                    receipt.total()
                );
            }
            Err(e) => log::warn!("Join of {entrant_id} into {tournament_id} rolled back: {e}"),
        }
        result
    }

    async fn collect_deposit(
        &self,
        uow: &mut dyn UnitOfWork,
        tournament_id: &str,
        entrant_id: &str,
        backer_ids: &[String],
    ) -> LedgerResult<JoinReceipt> {
        let tournament = self
            .registry
            .find(uow, tournament_id, TournamentLock::Share)
            .await?;

        let mut participant_ids = Vec::with_capacity(backer_ids.len() + 1);
        participant_ids.push(entrant_id);
        participant_ids.extend(backer_ids.iter().map(String::as_str));
        uow.lock_players(&participant_ids).await?;

        self.ledger.find_or_create(uow, entrant_id).await?;

        let shares = split_evenly(tournament.deposit, backer_ids.len() + 1)?;
        let mut debits = Vec::with_capacity(shares.len());
        for (participant, share) in participant_ids.into_iter().zip(shares) {
            if share > 0 {
                self.ledger.debit(uow, participant, share).await?;
            } else {
                // Deposit smaller than the group; still has to be a real account
                self.ledger.find(uow, participant).await?;
            }

            let backing = (participant != entrant_id).then_some(entrant_id);
            self.registry
                .record_entry(uow, &tournament.id, participant, backing)
                .await?;

            debits.push(Transfer {
                player_id: participant.to_string(),
                amount: share,
            });
        }

        Ok(JoinReceipt {
            tournament_id: tournament.id,
            entrant_id: entrant_id.to_string(),
            debits,
        })
    }

    /// Distribute prizes and close the tournament.
    ///
    /// Each winner's prize is split evenly across the winner and everyone who
    /// backed them, winner first. The tournament is then marked finished, so
    /// a second finish fails with `TournamentNotFound`.
    ///
    /// # Errors
    ///
    /// * `LedgerError::TournamentNotFound` - unknown or already finished
    /// * `LedgerError::NoEntries` - a winner never joined this tournament
    /// * `LedgerError::InvalidArgument` - no winners given
    /// * `LedgerError::InvalidAmount` - a prize is not positive
    ///
    /// On any error nobody is paid and the tournament stays open.
    pub async fn finish(
        &self,
        tournament_id: &str,
        winners: &[Winner],
    ) -> LedgerResult<FinishReceipt> {
        let result = with_timeout(self.transaction_timeout, async {
            validate_winners(winners)?;

            let mut uow = self.store.begin().await?;
            let receipt = self
                .distribute_prizes(uow.as_mut(), tournament_id, winners)
                .await?;
            uow.commit().await?;
            Ok(receipt)
        })
        .await;

        match &result {
            Ok(receipt) => log::info!(
                "Tournament {} settled: {} paid to {} account(s)",
                tournament_id,
                receipt.total(),
                receipt.credits.len()
            ),
            Err(e) => log::warn!("Finish of {tournament_id} rolled back: {e}"),
        }
        result
    }

    async fn distribute_prizes(
        &self,
        uow: &mut dyn UnitOfWork,
        tournament_id: &str,
        winners: &[Winner],
    ) -> LedgerResult<FinishReceipt> {
        // Row lock held until commit: a concurrent finish waits here, then
        // sees the tournament as finished.
        let tournament = self
            .registry
            .find(uow, tournament_id, TournamentLock::Update)
            .await?;

        let mut groups = Vec::with_capacity(winners.len());
        for winner in winners {
            let group = self
                .registry
                .entries_for(uow, &tournament.id, &winner.player_id)
                .await?;
            if group.is_empty() {
                return Err(LedgerError::NoEntries {
                    tournament: tournament.id.clone(),
                    player: winner.player_id.clone(),
                });
            }
            groups.push(group);
        }

        let payees: Vec<&str> = groups.iter().flatten().map(String::as_str).collect();
        uow.lock_players(&payees).await?;

        let mut credits = Vec::new();
        for (winner, group) in winners.iter().zip(groups) {
            let rewards = if group.len() == 1 {
                vec![winner.prize]
            } else {
                split_evenly(winner.prize, group.len())?
            };

            for (player_id, reward) in group.into_iter().zip(rewards) {
                if reward > 0 {
                    self.ledger.credit(uow, &player_id, reward).await?;
                }
                credits.push(Transfer {
                    player_id,
                    amount: reward,
                });
            }
        }

        debug_assert_eq!(
            credits.iter().map(|t| t.amount).sum::<i64>(),
            winners.iter().map(|w| w.prize).sum::<i64>(),
            "prize distribution must conserve points"
        );

        self.registry.mark_finished(uow, &tournament.id).await?;

        Ok(FinishReceipt {
            tournament_id: tournament.id,
            credits,
        })
    }

    /// Current balance of an existing player
    pub async fn balance(&self, player_id: &str) -> LedgerResult<Points> {
        Ok(self.player(player_id).await?.balance_points())
    }

    /// Get an existing player account
    pub async fn player(&self, player_id: &str) -> LedgerResult<Player> {
        with_timeout(self.transaction_timeout, async {
            let mut uow = self.store.begin().await?;
            self.ledger.find(uow.as_mut(), player_id).await
        })
        .await
    }

    /// Every player, tournament and entry
    pub async fn snapshot(&self) -> LedgerResult<LedgerSnapshot> {
        with_timeout(self.transaction_timeout, async {
            let mut uow = self.store.begin().await?;
            uow.snapshot().await
        })
        .await
    }

    /// Delete all accounts, tournaments and entries
    pub async fn reset(&self) -> LedgerResult<()> {
        with_timeout(self.transaction_timeout, async {
            let mut uow = self.store.begin().await?;
            uow.truncate().await?;
            uow.commit().await
        })
        .await?;

        log::warn!("Ledger reset: all accounts, tournaments and entries deleted");
        Ok(())
    }
}

fn validate_participants(entrant_id: &str, backer_ids: &[String]) -> LedgerResult<()> {
    validate_id(entrant_id)?;

    let mut seen = HashSet::with_capacity(backer_ids.len() + 1);
    seen.insert(entrant_id);
    for backer in backer_ids {
        validate_id(backer)?;
        if !seen.insert(backer.as_str()) {
            return Err(LedgerError::InvalidArgument(format!(
                "{backer} appears more than once among entrant and backers"
            )));
        }
    }
    Ok(())
}

fn validate_winners(winners: &[Winner]) -> LedgerResult<()> {
    if winners.is_empty() {
        return Err(LedgerError::InvalidArgument("no winners given".to_string()));
    }
    for winner in winners {
        validate_id(&winner.player_id)?;
        if winner.prize <= 0 {
            return Err(LedgerError::InvalidAmount(winner.prize));
        }
    }
    Ok(())
}

fn log_outcome<T>(operation: &str, subject: &str, result: &LedgerResult<T>) {
    match result {
        Ok(_) => log::debug!("{operation} {subject} committed"),
        Err(e) => log::warn!("{operation} {subject} rolled back: {e}"),
    }
}
