//! Property-based tests for splitting and conservation of points.

use points_ledger::split::split_evenly;
use points_ledger::store::MemoryStore;
use points_ledger::{LedgerError, SettlementEngine, Winner};
use proptest::prelude::*;
use std::sync::Arc;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime")
}

proptest! {
    #[test]
    fn test_split_sums_to_total(total in 0i64..10_000_000, parts in 1usize..64) {
        let shares = split_evenly(total, parts).unwrap();
        prop_assert_eq!(shares.len(), parts);
        prop_assert_eq!(shares.iter().sum::<i64>(), total);
    }

    #[test]
    fn test_split_shares_differ_by_at_most_one(total in 0i64..10_000_000, parts in 1usize..64) {
        let shares = split_evenly(total, parts).unwrap();
        let max = *shares.iter().max().unwrap();
        let min = *shares.iter().min().unwrap();
        prop_assert!(max - min <= 1);
    }

    #[test]
    fn test_split_remainder_leads(total in 0i64..10_000_000, parts in 1usize..64) {
        let shares = split_evenly(total, parts).unwrap();
        let base = total / parts as i64;
        let remainder = (total % parts as i64) as usize;

        for (i, share) in shares.iter().enumerate() {
            let expected = if i < remainder { base + 1 } else { base };
            prop_assert_eq!(*share, expected, "share {} of {:?}", i, shares);
        }
    }

    #[test]
    fn test_join_conserves_points(
        balances in prop::collection::vec(0i64..20_000, 1..6),
        deposit in 1i64..20_000,
    ) {
        let (before, after, result) = runtime().block_on(async {
            let engine = SettlementEngine::new(Arc::new(MemoryStore::new()));
            let ids: Vec<String> = (0..balances.len()).map(|i| format!("P{i}")).collect();
            for (id, &balance) in ids.iter().zip(&balances) {
                engine.fund(id, balance.max(1)).await.unwrap();
            }
            engine.open_tournament("t", deposit).await.unwrap();

            let before = engine.snapshot().await.unwrap().total_balance();
            let result = engine.join("t", &ids[0], &ids[1..]).await;
            let after = engine.snapshot().await.unwrap();
            (before, after, result)
        });

        match result {
            Ok(receipt) => {
                prop_assert_eq!(receipt.total(), deposit);
                prop_assert_eq!(before - after.total_balance(), deposit);
                prop_assert_eq!(after.entries.len(), balances.len());
            }
            Err(LedgerError::InsufficientFunds { .. }) => {
                prop_assert_eq!(before, after.total_balance());
                prop_assert!(after.entries.is_empty());
            }
            Err(e) => prop_assert!(false, "unexpected error {}", e),
        }
        prop_assert!(after.players.iter().all(|p| p.balance >= 0));
    }

    #[test]
    fn test_finish_conserves_prize(backer_count in 0usize..6, prize in 1i64..1_000_000) {
        let (before, after, receipt_total) = runtime().block_on(async {
            let engine = SettlementEngine::new(Arc::new(MemoryStore::new()));
            let ids: Vec<String> = (0..=backer_count).map(|i| format!("P{i}")).collect();
            for id in &ids {
                engine.fund(id, 1_000).await.unwrap();
            }
            engine.open_tournament("t", 600).await.unwrap();
            engine.join("t", &ids[0], &ids[1..]).await.unwrap();

            let before = engine.snapshot().await.unwrap().total_balance();
            let receipt = engine.finish("t", &[Winner::new(ids[0].clone(), prize)]).await.unwrap();
            let after = engine.snapshot().await.unwrap().total_balance();
            (before, after, receipt.total())
        });

        prop_assert_eq!(receipt_total, prize);
        prop_assert_eq!(after - before, prize);
    }
}
