/// Decimal precision for stored base-currency conversions
pub const DECIMAL_PRECISION: u32 = 6;

/// Decimal precision for display
pub const DISPLAY_DECIMAL_PRECISION: u32 = 2;

/// Maximum number of integer digits a monetary amount may carry.
/// Matches the fixed-precision numeric column in the store.
pub const MAX_AMOUNT_INTEGER_DIGITS: usize = 15;

/// Maximum number of tags on a single transaction
pub const MAX_TAGS_PER_TRANSACTION: usize = 5;

/// Name of the seeded system category for wallet opening balances
pub const CATEGORY_INITIAL_BALANCE: &str = "Initial Balance";

/// Name of the seeded system category for manual balance corrections
pub const CATEGORY_BALANCE_ADJUSTMENT: &str = "Balance Adjustment";

/// Fixed ID of the seeded "Initial Balance" category
pub const SYSTEM_CATEGORY_INITIAL_BALANCE_ID: &str = "system-initial-balance";

/// Fixed ID of the seeded "Balance Adjustment" category
pub const SYSTEM_CATEGORY_BALANCE_ADJUSTMENT_ID: &str = "system-balance-adjustment";

/// Default time-to-live for idempotency keys, in hours
pub const DEFAULT_IDEMPOTENCY_TTL_HOURS: i64 = 24;
