//! Currency registry - ISO 4217 codes and minor-unit exponents.

mod currency_table;

pub use currency_table::{
    is_supported, minor_unit_exponent, normalize_currency_code, validate_currency_code,
};
