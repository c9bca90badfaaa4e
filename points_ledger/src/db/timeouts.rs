//! Deadlines for units of work.
//!
//! Dropping a timed-out future drops its unit of work, which rolls it back.

use crate::errors::{LedgerError, LedgerResult};
use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

/// Default deadline for one join, finish or transfer (10 seconds)
pub const DEFAULT_TRANSACTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Run `future`, failing with [`LedgerError::Timeout`] if it outlives `duration`
pub async fn with_timeout<F, T>(duration: Duration, future: F) -> LedgerResult<T>
where
    F: Future<Output = LedgerResult<T>>,
{
    match timeout(duration, future).await {
        Ok(result) => result,
        Err(_) => Err(LedgerError::Timeout(duration)),
    }
}
