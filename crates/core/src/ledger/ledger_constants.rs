/// Transaction types
///
/// Each constant is the storage discriminator for one transaction shape.

/// Money entering a wallet. Carries a category. Increases the wallet balance.
pub const TRANSACTION_TYPE_INCOME: &str = "INCOME";

/// Money leaving a wallet. Carries a category. Decreases the wallet balance.
pub const TRANSACTION_TYPE_EXPENSE: &str = "EXPENSE";

/// Money moving between two wallets. No category. Debits the source wallet
/// and credits the destination wallet.
pub const TRANSACTION_TYPE_TRANSFER: &str = "TRANSFER";

/// System entry kinds

/// Opening balance recorded when a wallet is created with a starting balance.
pub const SYSTEM_KIND_INITIAL_BALANCE: &str = "INITIAL_BALANCE";

/// Manual correction that moves a wallet to an explicit target balance.
pub const SYSTEM_KIND_BALANCE_ADJUSTMENT: &str = "BALANCE_ADJUSTMENT";
