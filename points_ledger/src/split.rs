//! Even splitting of an amount across participants.

use crate::errors::{LedgerError, LedgerResult};

/// Split `total` into `parts` shares that differ by at most one minor unit.
///
/// The shares sum exactly to `total`. The `total % parts` leftover units go to
/// the leading shares, so with participants listed as `[entrant, backer1, ...]`
/// the entrant and earliest backers absorb the remainder.
///
/// ```
/// use points_ledger::split::split_evenly;
///
/// assert_eq!(split_evenly(5000, 3).unwrap(), vec![1667, 1667, 1666]);
/// ```
pub fn split_evenly(total: i64, parts: usize) -> LedgerResult<Vec<i64>> {
    if parts == 0 {
        return Err(LedgerError::InvalidArgument(
            "cannot split into zero parts".to_string(),
        ));
    }
    if total < 0 {
        return Err(LedgerError::InvalidAmount(total));
    }

    let divisor = i64::try_from(parts)
        .map_err(|_| LedgerError::InvalidArgument(format!("too many parts: {parts}")))?;
    let base = total / divisor;
    // remainder < parts, so the cast back cannot truncate
    let remainder = (total % divisor) as usize;

    Ok((0..parts)
        .map(|i| if i < remainder { base + 1 } else { base })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_exact() {
        assert_eq!(split_evenly(5000, 2).unwrap(), vec![2500, 2500]);
        assert_eq!(split_evenly(10_000, 1).unwrap(), vec![10_000]);
    }

    #[test]
    fn test_split_remainder_goes_first() {
        assert_eq!(split_evenly(5000, 3).unwrap(), vec![1667, 1667, 1666]);
        assert_eq!(split_evenly(10, 4).unwrap(), vec![3, 3, 2, 2]);
    }

    #[test]
    fn test_split_smaller_than_parts() {
        assert_eq!(split_evenly(2, 5).unwrap(), vec![1, 1, 0, 0, 0]);
        assert_eq!(split_evenly(0, 3).unwrap(), vec![0, 0, 0]);
    }

    #[test]
    fn test_split_zero_parts_rejected() {
        assert!(matches!(
            split_evenly(100, 0),
            Err(LedgerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_split_negative_total_rejected() {
        assert!(matches!(
            split_evenly(-1, 2),
            Err(LedgerError::InvalidAmount(-1))
        ));
    }
}
