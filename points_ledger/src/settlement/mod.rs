//! Settlement: moving deposits into tournaments and prizes back out.
//!
//! Every operation of [`SettlementEngine`] runs inside exactly one unit of
//! work. The first failure anywhere aborts and rolls back the whole unit, so
//! a join either debits every participant and records every entry, or does
//! nothing; a finish either pays every winner group and closes the
//! tournament, or does nothing.
//!
//! ## Example
//!
//! ```
//! use points_ledger::settlement::{SettlementEngine, Winner};
//! use points_ledger::store::MemoryStore;
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), points_ledger::LedgerError> {
//! let engine = SettlementEngine::new(Arc::new(MemoryStore::new()));
//!
//! engine.fund("P1", 10_000).await?;
//! engine.fund("P2", 10_000).await?;
//! engine.open_tournament("1", 5_000).await?;
//! engine.join("1", "P1", &["P2".to_string()]).await?;
//! engine.finish("1", &[Winner::new("P1", 10_000)]).await?;
//!
//! assert_eq!(engine.balance("P1").await?.minor(), 12_500);
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod models;

pub use engine::SettlementEngine;
pub use models::{FinishReceipt, JoinReceipt, Transfer, Winner};
