//! Account ledger: the only writer of player balances.

use crate::errors::{LedgerError, LedgerResult};
use crate::models::Player;
use crate::store::UnitOfWork;

/// Balance reads and writes inside a caller-supplied unit of work.
///
/// Nothing here commits; the caller decides when the unit of work is done.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccountLedger;

impl AccountLedger {
    pub fn new() -> Self {
        Self
    }

    /// Get an account, creating it with a zero balance if absent
    pub async fn find_or_create(
        &self,
        uow: &mut dyn UnitOfWork,
        player_id: &str,
    ) -> LedgerResult<Player> {
        validate_id(player_id)?;
        let player = uow.upsert_player(player_id).await?;
        log::trace!("Account {} ready, balance {}", player.id, player.balance);
        Ok(player)
    }

    /// Get an existing account
    pub async fn find(&self, uow: &mut dyn UnitOfWork, player_id: &str) -> LedgerResult<Player> {
        validate_id(player_id)?;
        uow.find_player(player_id)
            .await?
            .ok_or_else(|| LedgerError::PlayerNotFound(player_id.to_string()))
    }

    /// Add `amount` to an existing account; returns the new balance
    pub async fn credit(
        &self,
        uow: &mut dyn UnitOfWork,
        player_id: &str,
        amount: i64,
    ) -> LedgerResult<i64> {
        validate_id(player_id)?;
        validate_amount(amount)?;
        let balance = uow.credit(player_id, amount).await?;
        log::debug!("Credited {amount} to {player_id}, balance {balance}");
        Ok(balance)
    }

    /// Subtract `amount` from an existing account; returns the new balance
    ///
    /// # Errors
    ///
    /// * `LedgerError::InsufficientFunds` - balance would go negative; unchanged
    /// * `LedgerError::PlayerNotFound` - no such account
    pub async fn debit(
        &self,
        uow: &mut dyn UnitOfWork,
        player_id: &str,
        amount: i64,
    ) -> LedgerResult<i64> {
        validate_id(player_id)?;
        validate_amount(amount)?;
        let balance = uow.debit(player_id, amount).await?;
        log::debug!("Debited {amount} from {player_id}, balance {balance}");
        Ok(balance)
    }
}

pub(crate) fn validate_id(id: &str) -> LedgerResult<()> {
    if id.trim().is_empty() {
        return Err(LedgerError::InvalidArgument("empty identifier".to_string()));
    }
    Ok(())
}

fn validate_amount(amount: i64) -> LedgerResult<()> {
    if amount <= 0 {
        return Err(LedgerError::InvalidAmount(amount));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Store};

    #[tokio::test]
    async fn test_find_or_create_is_idempotent() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new();
        let mut uow = store.begin().await.unwrap();

        let first = ledger.find_or_create(uow.as_mut(), "P1").await.unwrap();
        ledger.credit(uow.as_mut(), "P1", 700).await.unwrap();
        let second = ledger.find_or_create(uow.as_mut(), "P1").await.unwrap();

        assert_eq!(first.balance, 0);
        assert_eq!(second.balance, 700);
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amounts() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new();
        let mut uow = store.begin().await.unwrap();
        ledger.find_or_create(uow.as_mut(), "P1").await.unwrap();

        assert!(matches!(
            ledger.credit(uow.as_mut(), "P1", 0).await,
            Err(LedgerError::InvalidAmount(0))
        ));
        assert!(matches!(
            ledger.debit(uow.as_mut(), "P1", -5).await,
            Err(LedgerError::InvalidAmount(-5))
        ));
    }

    #[tokio::test]
    async fn test_rejects_empty_ids() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new();
        let mut uow = store.begin().await.unwrap();

        assert!(matches!(
            ledger.find_or_create(uow.as_mut(), "  ").await,
            Err(LedgerError::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_insufficient_debit_leaves_balance() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new();
        let mut uow = store.begin().await.unwrap();
        ledger.find_or_create(uow.as_mut(), "P1").await.unwrap();
        ledger.credit(uow.as_mut(), "P1", 20_000).await.unwrap();

        let err = ledger.debit(uow.as_mut(), "P1", 30_000).await.unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(
            ledger.find(uow.as_mut(), "P1").await.unwrap().balance,
            20_000
        );
    }

    #[tokio::test]
    async fn test_unknown_account() {
        let store = MemoryStore::new();
        let ledger = AccountLedger::new();
        let mut uow = store.begin().await.unwrap();

        assert!(matches!(
            ledger.debit(uow.as_mut(), "P2", 100).await,
            Err(LedgerError::PlayerNotFound(_))
        ));
        assert!(matches!(
            ledger.credit(uow.as_mut(), "P2", 100).await,
            Err(LedgerError::PlayerNotFound(_))
        ));
        assert!(matches!(
            ledger.find(uow.as_mut(), "P2").await,
            Err(LedgerError::PlayerNotFound(_))
        ));
    }
}
