//! Maps core errors onto the HTTP surface.
//!
//! Every error body is `{ kind, message }`; rate-limit responses additionally
//! carry `retryAfter` (seconds). The kind is machine-readable so the client
//! can branch without parsing the message.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pennybook_core::errors::{DatabaseError, Error};
use pennybook_core::fx::FxError;
use pennybook_core::ledger::LedgerError;
use serde_json::json;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err)
    }
}

fn classify(err: &Error) -> (StatusCode, &'static str) {
    match err {
        Error::Validation(_) | Error::Amount(_) | Error::UnsupportedCurrency(_) => {
            (StatusCode::BAD_REQUEST, "validation_error")
        }
        Error::Ledger(ledger) => match ledger {
            LedgerError::OverdraftBlocked { .. } => (StatusCode::CONFLICT, "overdraft_blocked"),
            LedgerError::ExchangeRateRequired { .. } => {
                (StatusCode::CONFLICT, "exchange_rate_required")
            }
            LedgerError::SystemTransactionImmutable(_) => {
                (StatusCode::CONFLICT, "system_transaction_immutable")
            }
            LedgerError::WalletNotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            LedgerError::Consistency(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "consistency_error")
            }
            _ => (StatusCode::BAD_REQUEST, "validation_error"),
        },
        Error::Fx(FxError::RateNotFound(_)) => (StatusCode::NOT_FOUND, "not_found"),
        Error::Fx(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        Error::Database(db) => match db {
            DatabaseError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DatabaseError::UniqueViolation(_) => (StatusCode::CONFLICT, "conflict"),
            db if db.is_retryable() => (StatusCode::SERVICE_UNAVAILABLE, "storage_unavailable"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        },
        Error::CurrencyConversionFailed(_) => (StatusCode::BAD_REQUEST, "validation_error"),
        Error::Repository(_) | Error::Unexpected(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = classify(&self.0);
        if status.is_server_error() {
            tracing::error!(kind, "request failed: {}", self.0);
        } else {
            tracing::debug!(kind, "request rejected: {}", self.0);
        }
        let body = json!({
            "kind": kind,
            "message": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
