//! # Points Ledger
//!
//! A points ledger with tournament settlement. Players hold a non-negative
//! balance; tournaments collect a deposit from an entrant and its optional
//! backers, and later pay a prize back across the same group.
//!
//! ## Core Modules
//!
//! - [`split`]: Even, remainder-first splitting of an amount
//! - [`ledger`]: Account balances with atomic checked debits
//! - [`tournament`]: Tournament lifecycle and entry roster
//! - [`settlement`]: Join and finish protocols, one unit of work each
//! - [`store`]: Transactional store capability (PostgreSQL and in-memory)
//! - [`db`]: Connection pooling, schema and timeouts
//!
//! All amounts inside the ledger are integer minor units (1/100 of a point);
//! [`amount::Points`] converts at the edges.
//!
//! ## Example
//!
//! ```
//! use points_ledger::{SettlementEngine, store::MemoryStore};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), points_ledger::LedgerError> {
//! let engine = SettlementEngine::new(Arc::new(MemoryStore::new()));
//! engine.fund("P1", 10_000).await?;
//! assert_eq!(engine.balance("P1").await?.display_value(), 100.0);
//! # Ok(())
//! # }
//! ```

pub mod amount;
pub mod db;
pub mod errors;
pub mod ledger;
pub mod models;
pub mod settlement;
pub mod split;
pub mod store;
pub mod tournament;

pub use amount::Points;
pub use errors::{ErrorKind, LedgerError, LedgerResult};
pub use ledger::AccountLedger;
pub use models::{Entry, LedgerSnapshot, Player, Tournament};
pub use settlement::{FinishReceipt, JoinReceipt, SettlementEngine, Transfer, Winner};
pub use tournament::TournamentRegistry;
