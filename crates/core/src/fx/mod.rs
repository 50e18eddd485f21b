//! FX (Foreign Exchange) module - domain models, services, and traits.

mod fx_errors;
mod fx_model;
mod fx_service;
mod fx_traits;

#[cfg(test)]
mod fx_service_tests;

pub use fx_errors::FxError;
pub use fx_model::{
    ExchangeRate, NewExchangeRate, RateResolution, RateSeverity, RateSource, ResolverThresholds,
};
pub use fx_service::FxService;
pub use fx_traits::{FxRepositoryTrait, FxServiceTrait};
