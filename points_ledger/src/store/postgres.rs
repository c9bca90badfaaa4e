//! PostgreSQL store.
#![allow(clippy::needless_raw_string_hashes)]

use super::{Store, TournamentLock, UnitOfWork};
use crate::errors::{LedgerError, LedgerResult};
use crate::models::{Entry, LedgerSnapshot, Player, Tournament};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::sync::Arc;

/// Store backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgStore {
    pool: Arc<PgPool>,
}

impl PgStore {
    /// Create a new store over an existing pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> LedgerResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// Unit of work over one database transaction.
///
/// sqlx rolls the transaction back when it is dropped uncommitted.
struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn find_player(&mut self, player_id: &str) -> LedgerResult<Option<Player>> {
        let row = sqlx::query("SELECT id, balance FROM players WHERE id = $1")
            .bind(player_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.map(|r| Player {
            id: r.get("id"),
            balance: r.get("balance"),
        }))
    }

    async fn lock_players(&mut self, player_ids: &[&str]) -> LedgerResult<()> {
        let mut ids: Vec<String> = player_ids.iter().map(|id| id.to_string()).collect();
        ids.sort();
        ids.dedup();

        // LockRows sits above the sort, so rows are locked in id order
        sqlx::query("SELECT id FROM players WHERE id = ANY($1) ORDER BY id FOR UPDATE")
            .bind(&ids)
            .fetch_all(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn upsert_player(&mut self, player_id: &str) -> LedgerResult<Player> {
        // DO NOTHING leaves an existing row unlocked; lock order stays with lock_players
        sqlx::query(
            "INSERT INTO players (id, balance)
             VALUES ($1, 0)
             ON CONFLICT (id) DO NOTHING",
        )
        .bind(player_id)
        .execute(&mut *self.tx)
        .await?;

        let row = sqlx::query("SELECT id, balance FROM players WHERE id = $1")
            .bind(player_id)
            .fetch_one(&mut *self.tx)
            .await?;

        Ok(Player {
            id: row.get("id"),
            balance: row.get("balance"),
        })
    }

    async fn credit(&mut self, player_id: &str, amount: i64) -> LedgerResult<i64> {
        let current = sqlx::query("SELECT balance FROM players WHERE id = $1 FOR UPDATE")
            .bind(player_id)
            .fetch_optional(&mut *self.tx)
            .await?
            .ok_or_else(|| LedgerError::PlayerNotFound(player_id.to_string()))?;

        let current_balance: i64 = current.get("balance");
        let new_balance = current_balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::InvalidArgument("balance overflow".to_string()))?;

        sqlx::query("UPDATE players SET balance = $1 WHERE id = $2")
            .bind(new_balance)
            .bind(player_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(new_balance)
    }

    async fn debit(&mut self, player_id: &str, amount: i64) -> LedgerResult<i64> {
        // Check and update in one statement so concurrent debits can't both pass
        let updated = sqlx::query(
            "UPDATE players
             SET balance = balance - $1
             WHERE id = $2 AND balance >= $1
             RETURNING balance",
        )
        .bind(amount)
        .bind(player_id)
        .fetch_optional(&mut *self.tx)
        .await?;

        if let Some(row) = updated {
            return Ok(row.get("balance"));
        }

        // Either the account doesn't exist or the balance is too low
        let existing = sqlx::query("SELECT balance FROM players WHERE id = $1")
            .bind(player_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        match existing {
            Some(row) => Err(LedgerError::InsufficientFunds {
                player: player_id.to_string(),
                available: row.get("balance"),
                required: amount,
            }),
            None => Err(LedgerError::PlayerNotFound(player_id.to_string())),
        }
    }

    async fn insert_tournament(
        &mut self,
        tournament_id: &str,
        deposit: i64,
    ) -> LedgerResult<Tournament> {
        let row = sqlx::query(
            r#"
            INSERT INTO tournaments (id, deposit)
            VALUES ($1, $2)
            RETURNING id, deposit, finished
            "#,
        )
        .bind(tournament_id)
        .bind(deposit)
        .fetch_one(&mut *self.tx)
        .await
        .map_err(|e| LedgerError::from_tournament_insert(e, tournament_id))?;

        Ok(Tournament {
            id: row.get("id"),
            deposit: row.get("deposit"),
            finished: row.get("finished"),
        })
    }

    async fn find_open_tournament(
        &mut self,
        tournament_id: &str,
        lock: TournamentLock,
    ) -> LedgerResult<Option<Tournament>> {
        let sql = match lock {
            TournamentLock::Share => {
                "SELECT id, deposit, finished FROM tournaments
                 WHERE id = $1 AND finished = FALSE
                 FOR SHARE"
            }
            TournamentLock::Update => {
                "SELECT id, deposit, finished FROM tournaments
                 WHERE id = $1 AND finished = FALSE
                 FOR UPDATE"
            }
        };

        let row = sqlx::query(sql)
            .bind(tournament_id)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(row.map(|r| Tournament {
            id: r.get("id"),
            deposit: r.get("deposit"),
            finished: r.get("finished"),
        }))
    }

    async fn insert_entry(
        &mut self,
        tournament_id: &str,
        entrant_id: &str,
        backer_id: Option<&str>,
    ) -> LedgerResult<Entry> {
        let row = sqlx::query(
            r#"
            INSERT INTO tournament_entries (tournament_id, entrant_id, backer_id)
            VALUES ($1, $2, $3)
            RETURNING id, tournament_id, entrant_id, backer_id
            "#,
        )
        .bind(tournament_id)
        .bind(entrant_id)
        .bind(backer_id)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(entry_from_row(&row))
    }

    async fn entry_group(
        &mut self,
        tournament_id: &str,
        root_id: &str,
    ) -> LedgerResult<Vec<String>> {
        let rows = sqlx::query(
            r#"
            SELECT entrant_id
            FROM tournament_entries
            WHERE tournament_id = $1
              AND ((entrant_id = $2 AND backer_id IS NULL) OR backer_id = $2)
            ORDER BY (backer_id IS NOT NULL), id
            "#,
        )
        .bind(tournament_id)
        .bind(root_id)
        .fetch_all(&mut *self.tx)
        .await?;

        Ok(rows.into_iter().map(|r| r.get("entrant_id")).collect())
    }

    async fn mark_finished(&mut self, tournament_id: &str) -> LedgerResult<bool> {
        let result =
            sqlx::query("UPDATE tournaments SET finished = TRUE WHERE id = $1 AND finished = FALSE")
                .bind(tournament_id)
                .execute(&mut *self.tx)
                .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn snapshot(&mut self) -> LedgerResult<LedgerSnapshot> {
        let players = sqlx::query("SELECT id, balance FROM players ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await?
            .into_iter()
            .map(|r| Player {
                id: r.get("id"),
                balance: r.get("balance"),
            })
            .collect();

        let tournaments = sqlx::query("SELECT id, deposit, finished FROM tournaments ORDER BY id")
            .fetch_all(&mut *self.tx)
            .await?
            .into_iter()
            .map(|r| Tournament {
                id: r.get("id"),
                deposit: r.get("deposit"),
                finished: r.get("finished"),
            })
            .collect();

        let entries = sqlx::query(
            "SELECT id, tournament_id, entrant_id, backer_id FROM tournament_entries ORDER BY id",
        )
        .fetch_all(&mut *self.tx)
        .await?
        .iter()
        .map(entry_from_row)
        .collect();

        Ok(LedgerSnapshot {
            players,
            tournaments,
            entries,
        })
    }

    async fn truncate(&mut self) -> LedgerResult<()> {
        sqlx::query("TRUNCATE tournament_entries, tournaments, players RESTART IDENTITY")
            .execute(&mut *self.tx)
            .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> LedgerResult<()> {
        self.tx.commit().await?;
        Ok(())
    }
}

fn entry_from_row(row: &sqlx::postgres::PgRow) -> Entry {
    Entry {
        id: row.get("id"),
        tournament_id: row.get("tournament_id"),
        entrant_id: row.get("entrant_id"),
        backer_id: row.get("backer_id"),
    }
}
