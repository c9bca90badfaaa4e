//! Ledger error types.

use thiserror::Error;

/// Coarse classification of a [`LedgerError`].
///
/// The request layer translates each kind into its own outward signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidArgument,
    NotFound,
    InsufficientFunds,
    AlreadyExists,
    Internal,
}

/// Ledger and settlement errors
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Amount must be positive
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),

    /// Malformed argument (empty id, zero parts, unparsable points)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Player account not found
    #[error("Player not found: {0}")]
    PlayerNotFound(String),

    /// Tournament unknown or already finished
    #[error("Open tournament not found: {0}")]
    TournamentNotFound(String),

    /// Winner has no recorded entry in the tournament
    #[error("Player {player} has no entries in tournament {tournament}")]
    NoEntries { tournament: String, player: String },

    /// Debit would make the balance negative
    #[error("Insufficient balance for {player}: available {available}, required {required}")]
    InsufficientFunds {
        player: String,
        available: i64,
        required: i64,
    },

    /// Tournament id already taken
    #[error("Tournament already exists: {0}")]
    TournamentExists(String),

    /// Unit of work did not finish in time
    #[error("Transaction timed out after {0:?}")]
    Timeout(std::time::Duration),
}

impl LedgerError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::InvalidAmount(_) | LedgerError::InvalidArgument(_) => {
                ErrorKind::InvalidArgument
            }
            LedgerError::PlayerNotFound(_)
            | LedgerError::TournamentNotFound(_)
            | LedgerError::NoEntries { .. } => ErrorKind::NotFound,
            LedgerError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            LedgerError::TournamentExists(_) => ErrorKind::AlreadyExists,
            LedgerError::Database(_) | LedgerError::Timeout(_) => ErrorKind::Internal,
        }
    }

    /// Get a client-safe error message that doesn't leak store internals
    pub fn client_message(&self) -> String {
        match self {
            // Don't expose SQL details
            LedgerError::Database(_) | LedgerError::Timeout(_) => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }

    /// Map a unique-violation on tournament insert to [`LedgerError::TournamentExists`].
    pub(crate) fn from_tournament_insert(err: sqlx::Error, tournament_id: &str) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                LedgerError::TournamentExists(tournament_id.to_string())
            }
            _ => LedgerError::Database(err),
        }
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(LedgerError::InvalidAmount(0).kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            LedgerError::PlayerNotFound("P1".into()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LedgerError::NoEntries {
                tournament: "1".into(),
                player: "P2".into()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            LedgerError::InsufficientFunds {
                player: "P1".into(),
                available: 10,
                required: 20
            }
            .kind(),
            ErrorKind::InsufficientFunds
        );
        assert_eq!(
            LedgerError::TournamentExists("1".into()).kind(),
            ErrorKind::AlreadyExists
        );
        assert_eq!(
            LedgerError::Database(sqlx::Error::PoolTimedOut).kind(),
            ErrorKind::Internal
        );
    }

    #[test]
    fn test_client_message_sanitizes_database_errors() {
        let err = LedgerError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.client_message(), "Internal server error");

        let err = LedgerError::InsufficientFunds {
            player: "P1".into(),
            available: 100,
            required: 300,
        };
        assert!(err.client_message().contains("available 100"));
    }
}
