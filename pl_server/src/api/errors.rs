//! Translation of ledger errors into HTTP responses.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use points_ledger::{ErrorKind, LedgerError};
use serde::Serialize;

use crate::{logging, metrics};

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// A rejected request: status plus a client-safe message
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    /// Malformed or missing input
    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::FORBIDDEN,
            message: message.into(),
        }
    }

    /// Map a failed ledger `operation` on `subject`, recording the outcome.
    ///
    /// An unknown participant in a join and a winner without entries are
    /// business rejections of the request as a whole, so they answer 400
    /// rather than 404.
    pub fn ledger(operation: &'static str, subject: &str, err: LedgerError) -> Self {
        let status = match (operation, &err) {
            ("join", LedgerError::PlayerNotFound(_)) | (_, LedgerError::NoEntries { .. }) => {
                StatusCode::BAD_REQUEST
            }
            _ => status_for(err.kind()),
        };
        let message = err.client_message();

        if status.is_server_error() {
            tracing::error!(operation = operation, error = %err, "Ledger operation failed");
        }
        metrics::ledger_operations_total(operation, kind_label(err.kind()));
        logging::log_rejection(operation, subject, status.as_u16(), &message);

        Self { status, message }
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidArgument => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::InsufficientFunds | ErrorKind::AlreadyExists => StatusCode::BAD_REQUEST,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::InvalidArgument => "invalid_argument",
        ErrorKind::NotFound => "not_found",
        ErrorKind::InsufficientFunds => "insufficient_funds",
        ErrorKind::AlreadyExists => "already_exists",
        ErrorKind::Internal => "internal",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (LedgerError::InvalidAmount(-1), StatusCode::UNPROCESSABLE_ENTITY),
            (
                LedgerError::PlayerNotFound("P1".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                LedgerError::TournamentNotFound("1".into()),
                StatusCode::NOT_FOUND,
            ),
            (
                LedgerError::InsufficientFunds {
                    player: "P1".into(),
                    available: 0,
                    required: 1,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::TournamentExists("1".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                LedgerError::Timeout(std::time::Duration::from_secs(1)),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(ApiError::ledger("take", "P1", err).status, expected);
        }
    }

    #[test]
    fn test_business_rejections_are_bad_requests() {
        let err = ApiError::ledger("join", "1", LedgerError::PlayerNotFound("B1".into()));
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let err = ApiError::ledger(
            "finish",
            "1",
            LedgerError::NoEntries {
                tournament: "1".into(),
                player: "P9".into(),
            },
        );
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        // A missing tournament is still a 404 for joins
        let err = ApiError::ledger("join", "1", LedgerError::TournamentNotFound("1".into()));
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_internal_message_is_sanitized() {
        let err = ApiError::ledger(
            "fund",
            "P1",
            LedgerError::Timeout(std::time::Duration::from_millis(250)),
        );
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Internal server error");
    }
}
