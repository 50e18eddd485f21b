//! Reports module - per-wallet totals and net worth in the base currency.

mod reports_model;
mod reports_service;


pub use reports_model::{
    DateRange, NetWorthSummary, TotalsFilters, TotalsSummary, WalletScope, WalletValuation,
};
pub use reports_service::{ReportsService, ReportsServiceTrait};
