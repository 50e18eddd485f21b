//! Idempotency-key bookkeeping for retried ledger mutations.
//!
//! Callers attach an `Idempotency-Key` header to create/update requests; a
//! repeated key inside the TTL window returns the originally persisted
//! transaction without re-applying balance effects. The key lookup and the
//! first commit are check-and-set inside one storage transaction, so two
//! racing retries cannot both apply.

use chrono::{Duration, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::ledger::ledger_errors::LedgerError;

const MAX_KEY_LENGTH: usize = 255;

/// A stored idempotency key pointing at the transaction it produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdempotencyRecord {
    pub key: String,
    pub transaction_id: String,
    pub created_at: NaiveDateTime,
    pub expires_at: NaiveDateTime,
}

impl IdempotencyRecord {
    pub fn new(key: String, transaction_id: String, ttl: Duration) -> Self {
        let now = Utc::now().naive_utc();
        Self {
            key,
            transaction_id,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    pub fn is_expired(&self, now: NaiveDateTime) -> bool {
        self.expires_at <= now
    }
}

/// Validates a caller-supplied idempotency key.
pub fn validate_idempotency_key(key: &str) -> Result<()> {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidData("Idempotency key cannot be empty".to_string()).into());
    }
    if trimmed.len() > MAX_KEY_LENGTH {
        return Err(LedgerError::InvalidData(format!(
            "Idempotency key exceeds {MAX_KEY_LENGTH} characters"
        ))
        .into());
    }
    if !trimmed.chars().all(|c| c.is_ascii_graphic()) {
        return Err(
            LedgerError::InvalidData("Idempotency key must be printable ASCII".to_string()).into(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_expiry() {
        let record = IdempotencyRecord::new(
            "key-1".to_string(),
            "txn-1".to_string(),
            Duration::hours(24),
        );
        let now = Utc::now().naive_utc();
        assert!(!record.is_expired(now));
        assert!(record.is_expired(now + Duration::hours(25)));
    }

    #[test]
    fn test_key_validation() {
        assert!(validate_idempotency_key("retry-7f3a").is_ok());
        assert!(validate_idempotency_key("").is_err());
        assert!(validate_idempotency_key("   ").is_err());
        assert!(validate_idempotency_key(&"k".repeat(300)).is_err());
        assert!(validate_idempotency_key("has space").is_err());
    }
}
